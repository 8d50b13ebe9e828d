use async_trait::async_trait;
use sqlx::{query, query_as, query_scalar};
use std::collections::HashMap;

use super::{Backend, Repository};
use crate::db::Db;
use crate::error::AppError;
use crate::models::{
    Aprendiz, AprendizCurso, AprendizCursoData, AprendizData, Choice, Curso, CursoData,
    Instructor, InstructorCurso, InstructorCursoData, InstructorData, Programa, ProgramaData,
    Totales,
};
use crate::resource::Resource;

#[derive(Clone)]
pub struct PgBackend {
    db: Db,
}

impl PgBackend {
    pub fn new(db: Db) -> Self {
        Self { db }
    }
}

const APRENDIZ_COLUMNS: &str =
    "id, document, firstname, lastname, phone, email, birthdate, city, program";

const INSTRUCTOR_COLUMNS: &str =
    "id, tipo_documento, documento_id, nombre, apellido, telefono, correo, fecha_nacimiento, \
    ciudad, direccion, nivel_educativo, especialidad, anos_experiencia, activo, fecha_vinculacion";

const PROGRAMA_COLUMNS: &str =
    "id, codigo, nombre, nivel_formacion, modalidad, duracion_meses, duracion_horas, descripcion, \
    competencias, perfil_egreso, requisitos_ingreso, centro_formacion, regional, estado, fecha_creacion";

const CURSO_COLUMNS: &str =
    "id, codigo, nombre, programa_id, instructor_coordinador_id, fecha_inicio, fecha_fin, horario, \
    aula, cupos_maximos, estado, observaciones";

const ASIGNACION_COLUMNS: &str = "id, instructor_id, curso_id, rol";

const INSCRIPCION_COLUMNS: &str = "id, aprendiz_id, curso_id, estado, nota_final, observaciones";

async fn delete_row<R: Resource>(db: &Db, table: &str, id: i64) -> Result<bool, AppError> {
    let done = query(&format!("DELETE FROM {table} WHERE id = $1"))
        .bind(id)
        .execute(db)
        .await
        .map_err(|e| AppError::from_write(e, R::NOUN, id, None))?;
    Ok(done.rows_affected() > 0)
}

#[async_trait]
impl Repository<Aprendiz> for PgBackend {
    async fn list(&self) -> Result<Vec<Aprendiz>, AppError> {
        let sql = format!("SELECT {APRENDIZ_COLUMNS} FROM aprendices ORDER BY id");
        Ok(query_as::<_, Aprendiz>(&sql).fetch_all(&self.db).await?)
    }

    async fn get(&self, id: i64) -> Result<Option<Aprendiz>, AppError> {
        let sql = format!("SELECT {APRENDIZ_COLUMNS} FROM aprendices WHERE id = $1");
        Ok(query_as::<_, Aprendiz>(&sql)
            .bind(id)
            .fetch_optional(&self.db)
            .await?)
    }

    async fn insert(&self, d: &AprendizData) -> Result<Aprendiz, AppError> {
        let sql = format!(
            "INSERT INTO aprendices (document, firstname, lastname, phone, email, birthdate, city, program) \
             VALUES ($1,$2,$3,$4,$5,$6,$7,$8) RETURNING {APRENDIZ_COLUMNS}"
        );
        query_as::<_, Aprendiz>(&sql)
            .bind(&d.document)
            .bind(&d.firstname)
            .bind(&d.lastname)
            .bind(&d.phone)
            .bind(&d.email)
            .bind(d.birthdate)
            .bind(&d.city)
            .bind(&d.program)
            .fetch_one(&self.db)
            .await
            .map_err(|e| AppError::from_write(e, Aprendiz::NOUN, 0, Some(&d.document)))
    }

    async fn update(&self, id: i64, d: &AprendizData) -> Result<Option<Aprendiz>, AppError> {
        let sql = format!(
            "UPDATE aprendices SET document=$2, firstname=$3, lastname=$4, phone=$5, email=$6, \
             birthdate=$7, city=$8, program=$9 WHERE id=$1 RETURNING {APRENDIZ_COLUMNS}"
        );
        query_as::<_, Aprendiz>(&sql)
            .bind(id)
            .bind(&d.document)
            .bind(&d.firstname)
            .bind(&d.lastname)
            .bind(&d.phone)
            .bind(&d.email)
            .bind(d.birthdate)
            .bind(&d.city)
            .bind(&d.program)
            .fetch_optional(&self.db)
            .await
            .map_err(|e| AppError::from_write(e, Aprendiz::NOUN, id, Some(&d.document)))
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        delete_row::<Aprendiz>(&self.db, "aprendices", id).await
    }
}

#[async_trait]
impl Repository<Instructor> for PgBackend {
    async fn list(&self) -> Result<Vec<Instructor>, AppError> {
        let sql = format!("SELECT {INSTRUCTOR_COLUMNS} FROM instructores ORDER BY id");
        Ok(query_as::<_, Instructor>(&sql).fetch_all(&self.db).await?)
    }

    async fn get(&self, id: i64) -> Result<Option<Instructor>, AppError> {
        let sql = format!("SELECT {INSTRUCTOR_COLUMNS} FROM instructores WHERE id = $1");
        Ok(query_as::<_, Instructor>(&sql)
            .bind(id)
            .fetch_optional(&self.db)
            .await?)
    }

    async fn insert(&self, d: &InstructorData) -> Result<Instructor, AppError> {
        let sql = format!(
            "INSERT INTO instructores (tipo_documento, documento_id, nombre, apellido, telefono, correo, \
             fecha_nacimiento, ciudad, direccion, nivel_educativo, especialidad, anos_experiencia, \
             activo, fecha_vinculacion) \
             VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11,$12,$13,$14) RETURNING {INSTRUCTOR_COLUMNS}"
        );
        query_as::<_, Instructor>(&sql)
            .bind(d.tipo_documento.code())
            .bind(&d.documento_id)
            .bind(&d.nombre)
            .bind(&d.apellido)
            .bind(&d.telefono)
            .bind(&d.correo)
            .bind(d.fecha_nacimiento)
            .bind(&d.ciudad)
            .bind(&d.direccion)
            .bind(d.nivel_educativo.code())
            .bind(&d.especialidad)
            .bind(d.anos_experiencia)
            .bind(d.activo)
            .bind(d.fecha_vinculacion)
            .fetch_one(&self.db)
            .await
            .map_err(|e| AppError::from_write(e, Instructor::NOUN, 0, Some(&d.documento_id)))
    }

    async fn update(&self, id: i64, d: &InstructorData) -> Result<Option<Instructor>, AppError> {
        let sql = format!(
            "UPDATE instructores SET tipo_documento=$2, documento_id=$3, nombre=$4, apellido=$5, \
             telefono=$6, correo=$7, fecha_nacimiento=$8, ciudad=$9, direccion=$10, \
             nivel_educativo=$11, especialidad=$12, anos_experiencia=$13, activo=$14, \
             fecha_vinculacion=$15 WHERE id=$1 RETURNING {INSTRUCTOR_COLUMNS}"
        );
        query_as::<_, Instructor>(&sql)
            .bind(id)
            .bind(d.tipo_documento.code())
            .bind(&d.documento_id)
            .bind(&d.nombre)
            .bind(&d.apellido)
            .bind(&d.telefono)
            .bind(&d.correo)
            .bind(d.fecha_nacimiento)
            .bind(&d.ciudad)
            .bind(&d.direccion)
            .bind(d.nivel_educativo.code())
            .bind(&d.especialidad)
            .bind(d.anos_experiencia)
            .bind(d.activo)
            .bind(d.fecha_vinculacion)
            .fetch_optional(&self.db)
            .await
            .map_err(|e| AppError::from_write(e, Instructor::NOUN, id, Some(&d.documento_id)))
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        delete_row::<Instructor>(&self.db, "instructores", id).await
    }
}

#[async_trait]
impl Repository<Programa> for PgBackend {
    async fn list(&self) -> Result<Vec<Programa>, AppError> {
        let sql = format!("SELECT {PROGRAMA_COLUMNS} FROM programas ORDER BY id");
        Ok(query_as::<_, Programa>(&sql).fetch_all(&self.db).await?)
    }

    async fn get(&self, id: i64) -> Result<Option<Programa>, AppError> {
        let sql = format!("SELECT {PROGRAMA_COLUMNS} FROM programas WHERE id = $1");
        Ok(query_as::<_, Programa>(&sql)
            .bind(id)
            .fetch_optional(&self.db)
            .await?)
    }

    async fn insert(&self, d: &ProgramaData) -> Result<Programa, AppError> {
        let sql = format!(
            "INSERT INTO programas (codigo, nombre, nivel_formacion, modalidad, duracion_meses, \
             duracion_horas, descripcion, competencias, perfil_egreso, requisitos_ingreso, \
             centro_formacion, regional, estado, fecha_creacion) \
             VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11,$12,$13,$14) RETURNING {PROGRAMA_COLUMNS}"
        );
        query_as::<_, Programa>(&sql)
            .bind(&d.codigo)
            .bind(&d.nombre)
            .bind(d.nivel_formacion.code())
            .bind(d.modalidad.code())
            .bind(d.duracion_meses)
            .bind(d.duracion_horas)
            .bind(&d.descripcion)
            .bind(&d.competencias)
            .bind(&d.perfil_egreso)
            .bind(&d.requisitos_ingreso)
            .bind(&d.centro_formacion)
            .bind(&d.regional)
            .bind(d.estado.code())
            .bind(d.fecha_creacion)
            .fetch_one(&self.db)
            .await
            .map_err(|e| AppError::from_write(e, Programa::NOUN, 0, Some(&d.codigo)))
    }

    async fn update(&self, id: i64, d: &ProgramaData) -> Result<Option<Programa>, AppError> {
        let sql = format!(
            "UPDATE programas SET codigo=$2, nombre=$3, nivel_formacion=$4, modalidad=$5, \
             duracion_meses=$6, duracion_horas=$7, descripcion=$8, competencias=$9, \
             perfil_egreso=$10, requisitos_ingreso=$11, centro_formacion=$12, regional=$13, \
             estado=$14, fecha_creacion=$15 WHERE id=$1 RETURNING {PROGRAMA_COLUMNS}"
        );
        query_as::<_, Programa>(&sql)
            .bind(id)
            .bind(&d.codigo)
            .bind(&d.nombre)
            .bind(d.nivel_formacion.code())
            .bind(d.modalidad.code())
            .bind(d.duracion_meses)
            .bind(d.duracion_horas)
            .bind(&d.descripcion)
            .bind(&d.competencias)
            .bind(&d.perfil_egreso)
            .bind(&d.requisitos_ingreso)
            .bind(&d.centro_formacion)
            .bind(&d.regional)
            .bind(d.estado.code())
            .bind(d.fecha_creacion)
            .fetch_optional(&self.db)
            .await
            .map_err(|e| AppError::from_write(e, Programa::NOUN, id, Some(&d.codigo)))
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        delete_row::<Programa>(&self.db, "programas", id).await
    }
}

#[async_trait]
impl Repository<Curso> for PgBackend {
    async fn list(&self) -> Result<Vec<Curso>, AppError> {
        let sql = format!("SELECT {CURSO_COLUMNS} FROM cursos ORDER BY id");
        Ok(query_as::<_, Curso>(&sql).fetch_all(&self.db).await?)
    }

    async fn get(&self, id: i64) -> Result<Option<Curso>, AppError> {
        let sql = format!("SELECT {CURSO_COLUMNS} FROM cursos WHERE id = $1");
        Ok(query_as::<_, Curso>(&sql)
            .bind(id)
            .fetch_optional(&self.db)
            .await?)
    }

    async fn insert(&self, d: &CursoData) -> Result<Curso, AppError> {
        let sql = format!(
            "INSERT INTO cursos (codigo, nombre, programa_id, instructor_coordinador_id, fecha_inicio, \
             fecha_fin, horario, aula, cupos_maximos, estado, observaciones) \
             VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11) RETURNING {CURSO_COLUMNS}"
        );
        query_as::<_, Curso>(&sql)
            .bind(&d.codigo)
            .bind(&d.nombre)
            .bind(d.programa_id)
            .bind(d.instructor_coordinador_id)
            .bind(d.fecha_inicio)
            .bind(d.fecha_fin)
            .bind(&d.horario)
            .bind(&d.aula)
            .bind(d.cupos_maximos)
            .bind(d.estado.code())
            .bind(&d.observaciones)
            .fetch_one(&self.db)
            .await
            .map_err(|e| AppError::from_write(e, Curso::NOUN, 0, Some(&d.codigo)))
    }

    async fn update(&self, id: i64, d: &CursoData) -> Result<Option<Curso>, AppError> {
        let sql = format!(
            "UPDATE cursos SET codigo=$2, nombre=$3, programa_id=$4, instructor_coordinador_id=$5, \
             fecha_inicio=$6, fecha_fin=$7, horario=$8, aula=$9, cupos_maximos=$10, estado=$11, \
             observaciones=$12 WHERE id=$1 RETURNING {CURSO_COLUMNS}"
        );
        query_as::<_, Curso>(&sql)
            .bind(id)
            .bind(&d.codigo)
            .bind(&d.nombre)
            .bind(d.programa_id)
            .bind(d.instructor_coordinador_id)
            .bind(d.fecha_inicio)
            .bind(d.fecha_fin)
            .bind(&d.horario)
            .bind(&d.aula)
            .bind(d.cupos_maximos)
            .bind(d.estado.code())
            .bind(&d.observaciones)
            .fetch_optional(&self.db)
            .await
            .map_err(|e| AppError::from_write(e, Curso::NOUN, id, Some(&d.codigo)))
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        delete_row::<Curso>(&self.db, "cursos", id).await
    }
}

#[async_trait]
impl Repository<InstructorCurso> for PgBackend {
    async fn list(&self) -> Result<Vec<InstructorCurso>, AppError> {
        let sql = format!("SELECT {ASIGNACION_COLUMNS} FROM instructor_curso ORDER BY id");
        Ok(query_as::<_, InstructorCurso>(&sql).fetch_all(&self.db).await?)
    }

    async fn get(&self, id: i64) -> Result<Option<InstructorCurso>, AppError> {
        let sql = format!("SELECT {ASIGNACION_COLUMNS} FROM instructor_curso WHERE id = $1");
        Ok(query_as::<_, InstructorCurso>(&sql)
            .bind(id)
            .fetch_optional(&self.db)
            .await?)
    }

    async fn insert(&self, d: &InstructorCursoData) -> Result<InstructorCurso, AppError> {
        let sql = format!(
            "INSERT INTO instructor_curso (instructor_id, curso_id, rol) VALUES ($1,$2,$3) \
             RETURNING {ASIGNACION_COLUMNS}"
        );
        query_as::<_, InstructorCurso>(&sql)
            .bind(d.instructor_id)
            .bind(d.curso_id)
            .bind(&d.rol)
            .fetch_one(&self.db)
            .await
            .map_err(|e| AppError::from_write(e, InstructorCurso::NOUN, 0, None))
    }

    async fn update(
        &self,
        id: i64,
        d: &InstructorCursoData,
    ) -> Result<Option<InstructorCurso>, AppError> {
        let sql = format!(
            "UPDATE instructor_curso SET instructor_id=$2, curso_id=$3, rol=$4 WHERE id=$1 \
             RETURNING {ASIGNACION_COLUMNS}"
        );
        query_as::<_, InstructorCurso>(&sql)
            .bind(id)
            .bind(d.instructor_id)
            .bind(d.curso_id)
            .bind(&d.rol)
            .fetch_optional(&self.db)
            .await
            .map_err(|e| AppError::from_write(e, InstructorCurso::NOUN, id, None))
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        delete_row::<InstructorCurso>(&self.db, "instructor_curso", id).await
    }
}

#[async_trait]
impl Repository<AprendizCurso> for PgBackend {
    async fn list(&self) -> Result<Vec<AprendizCurso>, AppError> {
        let sql = format!("SELECT {INSCRIPCION_COLUMNS} FROM aprendiz_curso ORDER BY id");
        Ok(query_as::<_, AprendizCurso>(&sql).fetch_all(&self.db).await?)
    }

    async fn get(&self, id: i64) -> Result<Option<AprendizCurso>, AppError> {
        let sql = format!("SELECT {INSCRIPCION_COLUMNS} FROM aprendiz_curso WHERE id = $1");
        Ok(query_as::<_, AprendizCurso>(&sql)
            .bind(id)
            .fetch_optional(&self.db)
            .await?)
    }

    async fn insert(&self, d: &AprendizCursoData) -> Result<AprendizCurso, AppError> {
        let sql = format!(
            "INSERT INTO aprendiz_curso (aprendiz_id, curso_id, estado, nota_final, observaciones) \
             VALUES ($1,$2,$3,$4,$5) RETURNING {INSCRIPCION_COLUMNS}"
        );
        query_as::<_, AprendizCurso>(&sql)
            .bind(d.aprendiz_id)
            .bind(d.curso_id)
            .bind(d.estado.code())
            .bind(d.nota_final)
            .bind(&d.observaciones)
            .fetch_one(&self.db)
            .await
            .map_err(|e| AppError::from_write(e, AprendizCurso::NOUN, 0, None))
    }

    async fn update(
        &self,
        id: i64,
        d: &AprendizCursoData,
    ) -> Result<Option<AprendizCurso>, AppError> {
        let sql = format!(
            "UPDATE aprendiz_curso SET aprendiz_id=$2, curso_id=$3, estado=$4, nota_final=$5, \
             observaciones=$6 WHERE id=$1 RETURNING {INSCRIPCION_COLUMNS}"
        );
        query_as::<_, AprendizCurso>(&sql)
            .bind(id)
            .bind(d.aprendiz_id)
            .bind(d.curso_id)
            .bind(d.estado.code())
            .bind(d.nota_final)
            .bind(&d.observaciones)
            .fetch_optional(&self.db)
            .await
            .map_err(|e| AppError::from_write(e, AprendizCurso::NOUN, id, None))
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        delete_row::<AprendizCurso>(&self.db, "aprendiz_curso", id).await
    }
}

#[async_trait]
impl Backend for PgBackend {
    async fn programas_activos(&self) -> Result<Vec<Programa>, AppError> {
        let sql = format!(
            "SELECT {PROGRAMA_COLUMNS} FROM programas WHERE estado = 'ACT' ORDER BY nombre"
        );
        Ok(query_as::<_, Programa>(&sql).fetch_all(&self.db).await?)
    }

    async fn instructores_activos(&self) -> Result<Vec<Instructor>, AppError> {
        let sql = format!(
            "SELECT {INSTRUCTOR_COLUMNS} FROM instructores WHERE activo ORDER BY apellido, nombre"
        );
        Ok(query_as::<_, Instructor>(&sql).fetch_all(&self.db).await?)
    }

    async fn inscripciones_de_curso(&self, curso_id: i64) -> Result<Vec<AprendizCurso>, AppError> {
        let sql = format!(
            "SELECT {INSCRIPCION_COLUMNS} FROM aprendiz_curso WHERE curso_id = $1 ORDER BY id"
        );
        Ok(query_as::<_, AprendizCurso>(&sql)
            .bind(curso_id)
            .fetch_all(&self.db)
            .await?)
    }

    async fn asignaciones_de_curso(
        &self,
        curso_id: i64,
    ) -> Result<Vec<InstructorCurso>, AppError> {
        let sql = format!(
            "SELECT {ASIGNACION_COLUMNS} FROM instructor_curso WHERE curso_id = $1 ORDER BY id"
        );
        Ok(query_as::<_, InstructorCurso>(&sql)
            .bind(curso_id)
            .fetch_all(&self.db)
            .await?)
    }

    async fn inscritos_por_curso(&self) -> Result<HashMap<i64, i64>, AppError> {
        let rows: Vec<(i64, i64)> =
            query_as("SELECT curso_id, COUNT(*) FROM aprendiz_curso GROUP BY curso_id")
                .fetch_all(&self.db)
                .await?;
        Ok(rows.into_iter().collect())
    }

    async fn totales(&self) -> Result<Totales, AppError> {
        let count = |table: &'static str| {
            let db = self.db.clone();
            async move {
                query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM {table}"))
                    .fetch_one(&db)
                    .await
            }
        };
        Ok(Totales {
            instructores: count("instructores").await?,
            aprendices: count("aprendices").await?,
            programas: count("programas").await?,
            cursos: count("cursos").await?,
        })
    }
}

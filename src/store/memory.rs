//! In-process backend used by tests and local demos. Mirrors the foreign key
//! behavior of the Postgres schema: join rows cascade, referenced programs
//! and coordinators are protected.

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::Mutex;

use super::{Backend, Repository};
use crate::error::AppError;
use crate::models::{
    Aprendiz, AprendizCurso, Curso, EstadoPrograma, Instructor, InstructorCurso, Programa, Totales,
};
use crate::resource::Resource;

#[derive(Debug, Default)]
pub struct Tables {
    aprendices: BTreeMap<i64, Aprendiz>,
    instructores: BTreeMap<i64, Instructor>,
    programas: BTreeMap<i64, Programa>,
    cursos: BTreeMap<i64, Curso>,
    asignaciones: BTreeMap<i64, InstructorCurso>,
    inscripciones: BTreeMap<i64, AprendizCurso>,
    sequences: HashMap<&'static str, i64>,
}

impl Tables {
    fn next_id(&mut self, table: &'static str) -> i64 {
        let seq = self.sequences.entry(table).or_insert(0);
        *seq += 1;
        *seq
    }
}

#[derive(Clone, Default)]
pub struct MemoryBackend {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

pub trait MemoryTable: Resource {
    fn table(t: &Tables) -> &BTreeMap<i64, Self>;
    fn table_mut(t: &mut Tables) -> &mut BTreeMap<i64, Self>;

    /// Applies the schema's ON DELETE rules for row `id`.
    fn on_delete(_t: &mut Tables, _id: i64) -> Result<(), AppError> {
        Ok(())
    }
}

impl MemoryTable for Aprendiz {
    fn table(t: &Tables) -> &BTreeMap<i64, Self> {
        &t.aprendices
    }
    fn table_mut(t: &mut Tables) -> &mut BTreeMap<i64, Self> {
        &mut t.aprendices
    }
    fn on_delete(t: &mut Tables, id: i64) -> Result<(), AppError> {
        t.inscripciones.retain(|_, i| i.data.aprendiz_id != id);
        Ok(())
    }
}

impl MemoryTable for Instructor {
    fn table(t: &Tables) -> &BTreeMap<i64, Self> {
        &t.instructores
    }
    fn table_mut(t: &mut Tables) -> &mut BTreeMap<i64, Self> {
        &mut t.instructores
    }
    fn on_delete(t: &mut Tables, id: i64) -> Result<(), AppError> {
        if t.cursos.values().any(|c| c.data.instructor_coordinador_id == id) {
            return Err(AppError::InUse {
                entity: Self::NOUN,
                id,
            });
        }
        t.asignaciones.retain(|_, a| a.data.instructor_id != id);
        Ok(())
    }
}

impl MemoryTable for Programa {
    fn table(t: &Tables) -> &BTreeMap<i64, Self> {
        &t.programas
    }
    fn table_mut(t: &mut Tables) -> &mut BTreeMap<i64, Self> {
        &mut t.programas
    }
    fn on_delete(t: &mut Tables, id: i64) -> Result<(), AppError> {
        if t.cursos.values().any(|c| c.data.programa_id == id) {
            return Err(AppError::InUse {
                entity: Self::NOUN,
                id,
            });
        }
        Ok(())
    }
}

impl MemoryTable for Curso {
    fn table(t: &Tables) -> &BTreeMap<i64, Self> {
        &t.cursos
    }
    fn table_mut(t: &mut Tables) -> &mut BTreeMap<i64, Self> {
        &mut t.cursos
    }
    fn on_delete(t: &mut Tables, id: i64) -> Result<(), AppError> {
        t.asignaciones.retain(|_, a| a.data.curso_id != id);
        t.inscripciones.retain(|_, i| i.data.curso_id != id);
        Ok(())
    }
}

impl MemoryTable for InstructorCurso {
    fn table(t: &Tables) -> &BTreeMap<i64, Self> {
        &t.asignaciones
    }
    fn table_mut(t: &mut Tables) -> &mut BTreeMap<i64, Self> {
        &mut t.asignaciones
    }
}

impl MemoryTable for AprendizCurso {
    fn table(t: &Tables) -> &BTreeMap<i64, Self> {
        &t.inscripciones
    }
    fn table_mut(t: &mut Tables) -> &mut BTreeMap<i64, Self> {
        &mut t.inscripciones
    }
}

fn check_unique<R: MemoryTable>(t: &Tables, data: &R::Data, skip: Option<i64>) -> Result<(), AppError> {
    let Some(key) = R::natural_key(data) else {
        return Ok(());
    };
    let taken = R::table(t)
        .values()
        .any(|row| Some(row.id()) != skip && R::natural_key(row.data()) == Some(key));
    if taken {
        return Err(AppError::Duplicate {
            entity: R::NOUN,
            key: key.to_owned(),
        });
    }
    Ok(())
}

#[async_trait]
impl<R: MemoryTable> Repository<R> for MemoryBackend {
    async fn list(&self) -> Result<Vec<R>, AppError> {
        let t = self.tables.lock().await;
        Ok(R::table(&t).values().cloned().collect())
    }

    async fn get(&self, id: i64) -> Result<Option<R>, AppError> {
        let t = self.tables.lock().await;
        Ok(R::table(&t).get(&id).cloned())
    }

    async fn insert(&self, data: &R::Data) -> Result<R, AppError> {
        let mut t = self.tables.lock().await;
        check_unique::<R>(&t, data, None)?;
        let id = t.next_id(R::PATH);
        let row = R::from_parts(id, data.clone());
        R::table_mut(&mut t).insert(id, row.clone());
        Ok(row)
    }

    async fn update(&self, id: i64, data: &R::Data) -> Result<Option<R>, AppError> {
        let mut t = self.tables.lock().await;
        if !R::table(&t).contains_key(&id) {
            return Ok(None);
        }
        check_unique::<R>(&t, data, Some(id))?;
        let row = R::from_parts(id, data.clone());
        R::table_mut(&mut t).insert(id, row.clone());
        Ok(Some(row))
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let mut t = self.tables.lock().await;
        if !R::table(&t).contains_key(&id) {
            return Ok(false);
        }
        R::on_delete(&mut t, id)?;
        Ok(R::table_mut(&mut t).remove(&id).is_some())
    }
}

#[async_trait]
impl Backend for MemoryBackend {
    async fn programas_activos(&self) -> Result<Vec<Programa>, AppError> {
        let t = self.tables.lock().await;
        let mut rows: Vec<Programa> = t
            .programas
            .values()
            .filter(|p| p.data.estado == EstadoPrograma::Activo)
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.data.nombre.cmp(&b.data.nombre));
        Ok(rows)
    }

    async fn instructores_activos(&self) -> Result<Vec<Instructor>, AppError> {
        let t = self.tables.lock().await;
        let mut rows: Vec<Instructor> = t
            .instructores
            .values()
            .filter(|i| i.data.activo)
            .cloned()
            .collect();
        rows.sort_by(|a, b| {
            (&a.data.apellido, &a.data.nombre).cmp(&(&b.data.apellido, &b.data.nombre))
        });
        Ok(rows)
    }

    async fn inscripciones_de_curso(&self, curso_id: i64) -> Result<Vec<AprendizCurso>, AppError> {
        let t = self.tables.lock().await;
        Ok(t.inscripciones
            .values()
            .filter(|i| i.data.curso_id == curso_id)
            .cloned()
            .collect())
    }

    async fn asignaciones_de_curso(
        &self,
        curso_id: i64,
    ) -> Result<Vec<InstructorCurso>, AppError> {
        let t = self.tables.lock().await;
        Ok(t.asignaciones
            .values()
            .filter(|a| a.data.curso_id == curso_id)
            .cloned()
            .collect())
    }

    async fn inscritos_por_curso(&self) -> Result<HashMap<i64, i64>, AppError> {
        let t = self.tables.lock().await;
        let mut counts = HashMap::new();
        for i in t.inscripciones.values() {
            *counts.entry(i.data.curso_id).or_insert(0) += 1;
        }
        Ok(counts)
    }

    async fn totales(&self) -> Result<Totales, AppError> {
        let t = self.tables.lock().await;
        Ok(Totales {
            instructores: t.instructores.len() as i64,
            aprendices: t.aprendices.len() as i64,
            programas: t.programas.len() as i64,
            cursos: t.cursos.len() as i64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        AprendizCursoData, AprendizData, CursoData, EstadoCurso, EstadoInscripcion,
        InstructorCursoData, InstructorData, Modalidad, NivelEducativo, NivelFormacion,
        ProgramaData, TipoDocumento,
    };
    use chrono::NaiveDate;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn programa(codigo: &str, nombre: &str, estado: EstadoPrograma) -> ProgramaData {
        ProgramaData {
            codigo: codigo.into(),
            nombre: nombre.into(),
            nivel_formacion: NivelFormacion::Tecnologo,
            modalidad: Modalidad::Virtual,
            duracion_meses: 24,
            duracion_horas: 3840,
            descripcion: None,
            competencias: None,
            perfil_egreso: None,
            requisitos_ingreso: None,
            centro_formacion: None,
            regional: None,
            estado,
            fecha_creacion: None,
        }
    }

    fn instructor(nombre: &str, apellido: &str, activo: bool) -> InstructorData {
        InstructorData {
            tipo_documento: TipoDocumento::Cc,
            documento_id: "1020304050".into(),
            nombre: nombre.into(),
            apellido: apellido.into(),
            telefono: None,
            correo: "instructor@sena.edu.co".into(),
            fecha_nacimiento: day(1985, 3, 2),
            ciudad: None,
            direccion: None,
            nivel_educativo: NivelEducativo::Maestria,
            especialidad: None,
            anos_experiencia: 8,
            activo,
            fecha_vinculacion: day(2015, 7, 1),
        }
    }

    fn aprendiz(document: &str) -> AprendizData {
        AprendizData {
            document: document.into(),
            firstname: "Luis".into(),
            lastname: "Mora".into(),
            phone: None,
            email: "luis@example.com".into(),
            birthdate: None,
            city: None,
            program: None,
        }
    }

    fn curso(codigo: &str, programa_id: i64, instructor_id: i64) -> CursoData {
        CursoData {
            codigo: codigo.into(),
            nombre: "Desarrollo web".into(),
            programa_id,
            instructor_coordinador_id: instructor_id,
            fecha_inicio: day(2025, 1, 20),
            fecha_fin: day(2025, 11, 30),
            horario: None,
            aula: None,
            cupos_maximos: 30,
            estado: EstadoCurso::Programado,
            observaciones: None,
        }
    }

    async fn seeded() -> (MemoryBackend, Curso, Aprendiz, Instructor) {
        let store = MemoryBackend::new();
        let p: Programa = store
            .insert(&programa("ADSO-1", "Software", EstadoPrograma::Activo))
            .await
            .unwrap();
        let i: Instructor = store.insert(&instructor("Ana", "Ruiz", true)).await.unwrap();
        let c: Curso = store.insert(&curso("C-1", p.id, i.id)).await.unwrap();
        let a: Aprendiz = store.insert(&aprendiz("1001")).await.unwrap();
        (store, c, a, i)
    }

    #[tokio::test]
    async fn ids_are_assigned_per_table() {
        let store = MemoryBackend::new();
        let a: Aprendiz = store.insert(&aprendiz("1")).await.unwrap();
        let b: Aprendiz = store.insert(&aprendiz("2")).await.unwrap();
        let p: Programa = store
            .insert(&programa("X", "X", EstadoPrograma::Activo))
            .await
            .unwrap();
        assert_eq!((a.id, b.id, p.id), (1, 2, 1));
        let all: Vec<Aprendiz> = store.list().await.unwrap();
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn duplicate_natural_key_is_refused() {
        let store = MemoryBackend::new();
        let _: Aprendiz = store.insert(&aprendiz("1001")).await.unwrap();
        let err = Repository::<Aprendiz>::insert(&store, &aprendiz("1001"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Duplicate { ref key, .. } if key == "1001"));
    }

    #[tokio::test]
    async fn updating_a_row_keeps_its_own_key() {
        let store = MemoryBackend::new();
        let a: Aprendiz = store.insert(&aprendiz("1001")).await.unwrap();
        let mut data = a.data.clone();
        data.city = Some("Cali".into());
        let updated: Option<Aprendiz> = store.update(a.id, &data).await.unwrap();
        assert_eq!(updated.unwrap().data.city.as_deref(), Some("Cali"));
        let missing: Option<Aprendiz> = store.update(99, &data).await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn referenced_programa_cannot_be_deleted() {
        let (store, curso, _, instructor) = seeded().await;
        let err = Repository::<Programa>::delete(&store, curso.data.programa_id)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InUse { .. }));
        let err = Repository::<Instructor>::delete(&store, instructor.id)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InUse { .. }));
    }

    #[tokio::test]
    async fn deleting_a_curso_cascades_to_join_rows() {
        let (store, curso, aprendiz, instructor) = seeded().await;
        let _: AprendizCurso = store
            .insert(&AprendizCursoData {
                aprendiz_id: aprendiz.id,
                curso_id: curso.id,
                estado: EstadoInscripcion::Inscrito,
                nota_final: None,
                observaciones: None,
            })
            .await
            .unwrap();
        let _: InstructorCurso = store
            .insert(&InstructorCursoData {
                instructor_id: instructor.id,
                curso_id: curso.id,
                rol: Some("Técnico".into()),
            })
            .await
            .unwrap();
        assert_eq!(store.inscritos_por_curso().await.unwrap().get(&curso.id), Some(&1));

        assert!(Repository::<Curso>::delete(&store, curso.id).await.unwrap());
        assert!(store.inscripciones_de_curso(curso.id).await.unwrap().is_empty());
        assert!(store.asignaciones_de_curso(curso.id).await.unwrap().is_empty());
        assert!(!Repository::<Curso>::delete(&store, curso.id).await.unwrap());
    }

    #[tokio::test]
    async fn active_lists_are_filtered_and_ordered() {
        let store = MemoryBackend::new();
        for (codigo, nombre, estado) in [
            ("P1", "Zootecnia", EstadoPrograma::Activo),
            ("P2", "Agricultura", EstadoPrograma::Activo),
            ("P3", "Bilingüismo", EstadoPrograma::Suspendido),
        ] {
            let _: Programa = store.insert(&programa(codigo, nombre, estado)).await.unwrap();
        }
        for (nombre, apellido, activo) in [
            ("Pedro", "Torres", true),
            ("Ana", "Torres", true),
            ("Carla", "Acosta", false),
            ("Luis", "Bernal", true),
        ] {
            let _: Instructor = store.insert(&instructor(nombre, apellido, activo)).await.unwrap();
        }

        let programas: Vec<String> = store
            .programas_activos()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.data.nombre)
            .collect();
        assert_eq!(programas, ["Agricultura", "Zootecnia"]);

        let instructores: Vec<String> = store
            .instructores_activos()
            .await
            .unwrap()
            .into_iter()
            .map(|i| i.data.nombre)
            .collect();
        assert_eq!(instructores, ["Luis", "Ana", "Pedro"]);

        let totales = store.totales().await.unwrap();
        assert_eq!((totales.programas, totales.instructores), (3, 4));
    }
}

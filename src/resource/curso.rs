use async_trait::async_trait;

use super::{form_data, link, opt_display, opt_string, Resource};
use crate::error::AppError;
use crate::forms::curso::{AsignacionChoices, CursoChoices, InscripcionChoices};
use crate::forms::{
    AprendizCursoForm, CursoForm, FormData, FormErrors, InstructorCursoForm, Validated,
};
use crate::models::{
    Aprendiz, AprendizCurso, AprendizCursoData, Choice, Curso, CursoData, EstadoCurso,
    EstadoInscripcion, Instructor, InstructorCurso, InstructorCursoData, Programa,
};
use crate::render::{options, Cell, Field, FieldKind, Section};
use crate::store::{Backend, Repository};

fn select<R: Resource>(rows: &[R]) -> FieldKind {
    FieldKind::Select(
        rows.iter()
            .map(|r| (r.id().to_string(), r.display()))
            .collect(),
    )
}

async fn name_of<R: Resource, B: Backend + Repository<R>>(
    backend: &B,
    id: i64,
) -> Result<Cell, AppError> {
    Ok(match Repository::<R>::get(backend, id).await? {
        Some(row) => link::<R>(id, row.display()),
        None => Cell::Text(format!("#{id}")),
    })
}

#[async_trait]
impl Resource for Curso {
    type Data = CursoData;
    type Context = CursoChoices;

    const PATH: &'static str = "cursos";
    const TITLE: &'static str = "Cursos";
    const NOUN: &'static str = "el curso";
    const KEY_LABEL: &'static str = "el código";

    fn id(&self) -> i64 {
        self.id
    }

    fn data(&self) -> &CursoData {
        &self.data
    }

    fn from_parts(id: i64, data: CursoData) -> Self {
        Curso { id, data }
    }

    fn display(&self) -> String {
        format!("{} - {}", self.data.codigo, self.data.nombre)
    }

    fn natural_key(data: &CursoData) -> Option<&str> {
        Some(&data.codigo)
    }

    async fn context<B: Backend>(backend: &B) -> Result<CursoChoices, AppError> {
        Ok(CursoChoices {
            programas: backend.programas_activos().await?,
            instructores: backend.instructores_activos().await?,
        })
    }

    fn validate(
        form: &FormData,
        ctx: &CursoChoices,
        _existing: Option<&Self>,
    ) -> Result<Validated<CursoData>, FormErrors> {
        CursoForm::validate(form, ctx)
    }

    fn blank() -> FormData {
        form_data(vec![("estado", EstadoCurso::Programado.code().into())])
    }

    fn initial(&self) -> FormData {
        let d = &self.data;
        form_data(vec![
            ("codigo", d.codigo.clone()),
            ("nombre", d.nombre.clone()),
            ("programa", d.programa_id.to_string()),
            ("instructor_coordinador", d.instructor_coordinador_id.to_string()),
            ("fecha_inicio", d.fecha_inicio.to_string()),
            ("fecha_fin", d.fecha_fin.to_string()),
            ("horario", opt_string(&d.horario)),
            ("aula", opt_string(&d.aula)),
            ("cupos_maximos", d.cupos_maximos.to_string()),
            ("estado", d.estado.code().to_string()),
            ("observaciones", opt_string(&d.observaciones)),
        ])
    }

    fn fields(ctx: &CursoChoices) -> Vec<Field> {
        vec![
            Field::new("codigo", "Código del Curso", FieldKind::Text)
                .placeholder("Ej: CURSO-2024-001"),
            Field::new("nombre", "Nombre del Curso", FieldKind::Text)
                .placeholder("Ingrese el nombre del curso"),
            Field::new("programa", "Programa de Formación", select(&ctx.programas)),
            Field::new(
                "instructor_coordinador",
                "Instructor Coordinador",
                select(&ctx.instructores),
            ),
            Field::new("fecha_inicio", "Fecha de Inicio", FieldKind::Date),
            Field::new("fecha_fin", "Fecha de Finalización", FieldKind::Date),
            Field::new("horario", "Horario", FieldKind::Text)
                .placeholder("Ej: Lunes a Viernes 8:00 AM - 12:00 PM"),
            Field::new("aula", "Aula/Ambiente", FieldKind::Text).placeholder("Ej: Aula 101, Lab 203"),
            Field::new("cupos_maximos", "Cupos Máximos", FieldKind::Number)
                .placeholder("Número máximo de aprendices"),
            Field::new("estado", "Estado del Curso", FieldKind::Select(options::<EstadoCurso>())),
            Field::new("observaciones", "Observaciones", FieldKind::TextArea { rows: 3 })
                .placeholder("Observaciones adicionales sobre el curso"),
        ]
    }

    fn columns() -> &'static [&'static str] {
        &["Código", "Nombre", "Inicio", "Fin", "Cupos", "Estado"]
    }

    fn cells(&self) -> Vec<Cell> {
        let d = &self.data;
        vec![
            Cell::text(&d.codigo),
            Cell::text(&d.nombre),
            Cell::text(d.fecha_inicio),
            Cell::text(d.fecha_fin),
            Cell::text(d.cupos_maximos),
            Cell::text(d.estado.label()),
        ]
    }

    fn summary(&self) -> Vec<(&'static str, Cell)> {
        let d = &self.data;
        vec![
            ("Código del Curso", Cell::text(&d.codigo)),
            ("Nombre del Curso", Cell::text(&d.nombre)),
            ("Fecha de Inicio", Cell::text(d.fecha_inicio)),
            ("Fecha de Finalización", Cell::text(d.fecha_fin)),
            ("Horario", Cell::opt(d.horario.as_ref())),
            ("Aula/Ambiente", Cell::opt(d.aula.as_ref())),
            ("Cupos Máximos", Cell::text(d.cupos_maximos)),
            ("Estado del Curso", Cell::text(d.estado.label())),
            ("Observaciones", Cell::opt(d.observaciones.as_ref())),
        ]
    }

    async fn related<B: Backend>(&self, backend: &B) -> Result<Vec<Section>, AppError> {
        let programa = name_of::<Programa, B>(backend, self.data.programa_id).await?;
        let coordinador =
            name_of::<Instructor, B>(backend, self.data.instructor_coordinador_id).await?;

        let inscripciones = backend.inscripciones_de_curso(self.id).await?;
        let asignaciones = backend.asignaciones_de_curso(self.id).await?;
        let disponibles = self.cupos_disponibles(inscripciones.len() as i64);

        let mut aprendices = Vec::with_capacity(inscripciones.len());
        for i in &inscripciones {
            aprendices.push(vec![
                name_of::<Aprendiz, B>(backend, i.data.aprendiz_id).await?,
                Cell::text(i.data.estado.label()),
                Cell::opt(i.data.nota_final),
                link::<AprendizCurso>(i.id, "Ver"),
            ]);
        }

        let mut instructores = Vec::with_capacity(asignaciones.len());
        for a in &asignaciones {
            instructores.push(vec![
                name_of::<Instructor, B>(backend, a.data.instructor_id).await?,
                Cell::opt(a.data.rol.as_ref()),
                link::<InstructorCurso>(a.id, "Ver"),
            ]);
        }

        Ok(vec![
            Section {
                title: "Programa y coordinación".into(),
                columns: vec!["Programa", "Instructor Coordinador", "Cupos Disponibles"],
                rows: vec![vec![programa, coordinador, Cell::text(disponibles)]],
            },
            Section {
                title: "Aprendices inscritos".into(),
                columns: vec!["Aprendiz", "Estado", "Nota Final", ""],
                rows: aprendices,
            },
            Section {
                title: "Instructores asignados".into(),
                columns: vec!["Instructor", "Rol", ""],
                rows: instructores,
            },
        ])
    }
}

#[async_trait]
impl Resource for InstructorCurso {
    type Data = InstructorCursoData;
    type Context = AsignacionChoices;

    const PATH: &'static str = "asignaciones";
    const TITLE: &'static str = "Asignaciones de Instructores";
    const NOUN: &'static str = "la asignación";
    const FEMININE: bool = true;

    fn id(&self) -> i64 {
        self.id
    }

    fn data(&self) -> &InstructorCursoData {
        &self.data
    }

    fn from_parts(id: i64, data: InstructorCursoData) -> Self {
        InstructorCurso { id, data }
    }

    fn display(&self) -> String {
        format!("#{}", self.id)
    }

    async fn context<B: Backend>(backend: &B) -> Result<AsignacionChoices, AppError> {
        Ok(AsignacionChoices {
            instructores: backend.instructores_activos().await?,
            cursos: Repository::<Curso>::list(backend).await?,
        })
    }

    fn validate(
        form: &FormData,
        ctx: &AsignacionChoices,
        _existing: Option<&Self>,
    ) -> Result<Validated<InstructorCursoData>, FormErrors> {
        InstructorCursoForm::validate(form, ctx)
    }

    fn initial(&self) -> FormData {
        let d = &self.data;
        form_data(vec![
            ("instructor", d.instructor_id.to_string()),
            ("curso", d.curso_id.to_string()),
            ("rol", opt_string(&d.rol)),
        ])
    }

    fn fields(ctx: &AsignacionChoices) -> Vec<Field> {
        vec![
            Field::new("instructor", "Instructor", select(&ctx.instructores)),
            Field::new("curso", "Curso", select(&ctx.cursos)),
            Field::new("rol", "Rol en el Curso", FieldKind::Text)
                .placeholder("Ej: Instructor de Práctica, Instructor Técnico"),
        ]
    }

    fn columns() -> &'static [&'static str] {
        &["Instructor", "Curso", "Rol"]
    }

    fn cells(&self) -> Vec<Cell> {
        let d = &self.data;
        vec![
            link::<Instructor>(d.instructor_id, format!("Instructor #{}", d.instructor_id)),
            link::<Curso>(d.curso_id, format!("Curso #{}", d.curso_id)),
            Cell::opt(d.rol.as_ref()),
        ]
    }

    fn summary(&self) -> Vec<(&'static str, Cell)> {
        vec![("Rol en el Curso", Cell::opt(self.data.rol.as_ref()))]
    }

    async fn related<B: Backend>(&self, backend: &B) -> Result<Vec<Section>, AppError> {
        Ok(vec![Section {
            title: "Asignación".into(),
            columns: vec!["Instructor", "Curso"],
            rows: vec![vec![
                name_of::<Instructor, B>(backend, self.data.instructor_id).await?,
                name_of::<Curso, B>(backend, self.data.curso_id).await?,
            ]],
        }])
    }
}

#[async_trait]
impl Resource for AprendizCurso {
    type Data = AprendizCursoData;
    type Context = InscripcionChoices;

    const PATH: &'static str = "inscripciones";
    const TITLE: &'static str = "Inscripciones";
    const NOUN: &'static str = "la inscripción";
    const FEMININE: bool = true;

    fn id(&self) -> i64 {
        self.id
    }

    fn data(&self) -> &AprendizCursoData {
        &self.data
    }

    fn from_parts(id: i64, data: AprendizCursoData) -> Self {
        AprendizCurso { id, data }
    }

    fn display(&self) -> String {
        format!("#{}", self.id)
    }

    async fn context<B: Backend>(backend: &B) -> Result<InscripcionChoices, AppError> {
        Ok(InscripcionChoices {
            aprendices: Repository::<Aprendiz>::list(backend).await?,
            cursos: Repository::<Curso>::list(backend).await?,
            inscritos: backend.inscritos_por_curso().await?,
        })
    }

    fn validate(
        form: &FormData,
        ctx: &InscripcionChoices,
        existing: Option<&Self>,
    ) -> Result<Validated<AprendizCursoData>, FormErrors> {
        AprendizCursoForm::validate(form, ctx, existing)
    }

    fn blank() -> FormData {
        form_data(vec![("estado", EstadoInscripcion::Inscrito.code().into())])
    }

    fn initial(&self) -> FormData {
        let d = &self.data;
        form_data(vec![
            ("aprendiz", d.aprendiz_id.to_string()),
            ("curso", d.curso_id.to_string()),
            ("estado", d.estado.code().to_string()),
            ("nota_final", opt_display(&d.nota_final)),
            ("observaciones", opt_string(&d.observaciones)),
        ])
    }

    fn fields(ctx: &InscripcionChoices) -> Vec<Field> {
        vec![
            Field::new("aprendiz", "Aprendiz", select(&ctx.aprendices)),
            Field::new("curso", "Curso", select(&ctx.cursos)),
            Field::new("estado", "Estado en el Curso", FieldKind::Select(options::<EstadoInscripcion>())),
            Field::new("nota_final", "Nota Final", FieldKind::Decimal).placeholder("Nota de 0.0 a 5.0"),
            Field::new("observaciones", "Observaciones", FieldKind::TextArea { rows: 3 })
                .placeholder("Observaciones sobre el desempeño del aprendiz"),
        ]
    }

    fn columns() -> &'static [&'static str] {
        &["Aprendiz", "Curso", "Estado", "Nota Final"]
    }

    fn cells(&self) -> Vec<Cell> {
        let d = &self.data;
        vec![
            link::<Aprendiz>(d.aprendiz_id, format!("Aprendiz #{}", d.aprendiz_id)),
            link::<Curso>(d.curso_id, format!("Curso #{}", d.curso_id)),
            Cell::text(d.estado.label()),
            Cell::opt(d.nota_final),
        ]
    }

    fn summary(&self) -> Vec<(&'static str, Cell)> {
        let d = &self.data;
        vec![
            ("Estado en el Curso", Cell::text(d.estado.label())),
            ("Nota Final", Cell::opt(d.nota_final)),
            ("Observaciones", Cell::opt(d.observaciones.as_ref())),
        ]
    }

    async fn related<B: Backend>(&self, backend: &B) -> Result<Vec<Section>, AppError> {
        Ok(vec![Section {
            title: "Inscripción".into(),
            columns: vec!["Aprendiz", "Curso"],
            rows: vec![vec![
                name_of::<Aprendiz, B>(backend, self.data.aprendiz_id).await?,
                name_of::<Curso, B>(backend, self.data.curso_id).await?,
            ]],
        }])
    }
}

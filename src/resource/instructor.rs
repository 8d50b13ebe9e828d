use async_trait::async_trait;

use super::{form_data, opt_string, Resource};
use crate::error::AppError;
use crate::forms::{FormData, FormErrors, InstructorForm, Validated};
use crate::models::{Choice, Instructor, InstructorData, NivelEducativo, TipoDocumento};
use crate::render::{options, Cell, Field, FieldKind};
use crate::store::Backend;

#[async_trait]
impl Resource for Instructor {
    type Data = InstructorData;
    type Context = ();

    const PATH: &'static str = "instructores";
    const TITLE: &'static str = "Instructores";
    const NOUN: &'static str = "el instructor";

    fn id(&self) -> i64 {
        self.id
    }

    fn data(&self) -> &InstructorData {
        &self.data
    }

    fn from_parts(id: i64, data: InstructorData) -> Self {
        Instructor { id, data }
    }

    fn display(&self) -> String {
        format!("{} {}", self.data.nombre, self.data.apellido)
    }

    async fn context<B: Backend>(_backend: &B) -> Result<(), AppError> {
        Ok(())
    }

    fn validate(
        form: &FormData,
        _ctx: &(),
        _existing: Option<&Self>,
    ) -> Result<Validated<InstructorData>, FormErrors> {
        InstructorForm::validate(form)
    }

    fn blank() -> FormData {
        form_data(vec![("activo", "on".into())])
    }

    fn initial(&self) -> FormData {
        let d = &self.data;
        form_data(vec![
            ("tipo_documento", d.tipo_documento.code().to_string()),
            ("documento_id", d.documento_id.clone()),
            ("nombre", d.nombre.clone()),
            ("apellido", d.apellido.clone()),
            ("telefono", opt_string(&d.telefono)),
            ("correo", d.correo.clone()),
            ("fecha_nacimiento", d.fecha_nacimiento.to_string()),
            ("ciudad", opt_string(&d.ciudad)),
            ("direccion", opt_string(&d.direccion)),
            ("nivel_educativo", d.nivel_educativo.code().to_string()),
            ("especialidad", opt_string(&d.especialidad)),
            ("anos_experiencia", d.anos_experiencia.to_string()),
            ("activo", if d.activo { "on".into() } else { String::new() }),
            ("fecha_vinculacion", d.fecha_vinculacion.to_string()),
        ])
    }

    fn fields(_ctx: &()) -> Vec<Field> {
        vec![
            Field::new("tipo_documento", "Tipo de Documento", FieldKind::Select(options::<TipoDocumento>())),
            Field::new("documento_id", "Número de Documento", FieldKind::Text)
                .placeholder("Ingrese el número de documento"),
            Field::new("nombre", "Nombre", FieldKind::Text).placeholder("Ingrese el nombre"),
            Field::new("apellido", "Apellido", FieldKind::Text).placeholder("Ingrese el apellido"),
            Field::new("telefono", "Teléfono", FieldKind::Text).placeholder("3001234567"),
            Field::new("correo", "Correo Electrónico", FieldKind::Email)
                .placeholder("correo@ejemplo.com"),
            Field::new("fecha_nacimiento", "Fecha de Nacimiento", FieldKind::Date),
            Field::new("ciudad", "Ciudad", FieldKind::Text).placeholder("Ciudad de residencia"),
            Field::new("direccion", "Dirección", FieldKind::TextArea { rows: 3 })
                .placeholder("Dirección completa"),
            Field::new("nivel_educativo", "Nivel Educativo", FieldKind::Select(options::<NivelEducativo>())),
            Field::new("especialidad", "Especialidad", FieldKind::Text)
                .placeholder("Área de especialización"),
            Field::new("anos_experiencia", "Años de Experiencia", FieldKind::Number)
                .placeholder("Años de experiencia"),
            Field::new("activo", "Activo", FieldKind::Checkbox),
            Field::new("fecha_vinculacion", "Fecha de Vinculación", FieldKind::Date),
        ]
    }

    fn columns() -> &'static [&'static str] {
        &["Documento", "Nombre", "Apellido", "Especialidad", "Activo"]
    }

    fn cells(&self) -> Vec<Cell> {
        let d = &self.data;
        vec![
            Cell::text(format!("{} {}", d.tipo_documento.code(), d.documento_id)),
            Cell::text(&d.nombre),
            Cell::text(&d.apellido),
            Cell::opt(d.especialidad.as_ref()),
            Cell::text(if d.activo { "Sí" } else { "No" }),
        ]
    }

    fn summary(&self) -> Vec<(&'static str, Cell)> {
        let d = &self.data;
        vec![
            ("Tipo de Documento", Cell::text(d.tipo_documento.label())),
            ("Número de Documento", Cell::text(&d.documento_id)),
            ("Nombre", Cell::text(&d.nombre)),
            ("Apellido", Cell::text(&d.apellido)),
            ("Teléfono", Cell::opt(d.telefono.as_ref())),
            ("Correo Electrónico", Cell::text(&d.correo)),
            ("Fecha de Nacimiento", Cell::text(d.fecha_nacimiento)),
            ("Ciudad", Cell::opt(d.ciudad.as_ref())),
            ("Dirección", Cell::opt(d.direccion.as_ref())),
            ("Nivel Educativo", Cell::text(d.nivel_educativo.label())),
            ("Especialidad", Cell::opt(d.especialidad.as_ref())),
            ("Años de Experiencia", Cell::text(d.anos_experiencia)),
            ("Activo", Cell::text(if d.activo { "Sí" } else { "No" })),
            ("Fecha de Vinculación", Cell::text(d.fecha_vinculacion)),
        ]
    }
}

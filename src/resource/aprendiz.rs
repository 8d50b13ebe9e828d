use async_trait::async_trait;

use super::{form_data, opt_display, opt_string, Resource};
use crate::error::AppError;
use crate::forms::{AprendizForm, FormData, FormErrors, Validated};
use crate::models::{Aprendiz, AprendizData};
use crate::render::{Cell, Field, FieldKind};
use crate::store::Backend;

#[async_trait]
impl Resource for Aprendiz {
    type Data = AprendizData;
    type Context = ();

    const PATH: &'static str = "aprendices";
    const TITLE: &'static str = "Aprendices";
    const NOUN: &'static str = "el aprendiz";
    const KEY_LABEL: &'static str = "el documento";

    fn id(&self) -> i64 {
        self.id
    }

    fn data(&self) -> &AprendizData {
        &self.data
    }

    fn from_parts(id: i64, data: AprendizData) -> Self {
        Aprendiz { id, data }
    }

    fn display(&self) -> String {
        format!("{} {}", self.data.firstname, self.data.lastname)
    }

    fn natural_key(data: &AprendizData) -> Option<&str> {
        Some(&data.document)
    }

    async fn context<B: Backend>(_backend: &B) -> Result<(), AppError> {
        Ok(())
    }

    fn validate(
        form: &FormData,
        _ctx: &(),
        _existing: Option<&Self>,
    ) -> Result<Validated<AprendizData>, FormErrors> {
        AprendizForm::validate(form)
    }

    fn initial(&self) -> FormData {
        let d = &self.data;
        form_data(vec![
            ("document", d.document.clone()),
            ("firstname", d.firstname.clone()),
            ("lastname", d.lastname.clone()),
            ("phone", opt_string(&d.phone)),
            ("email", d.email.clone()),
            ("birthdate", opt_display(&d.birthdate)),
            ("city", opt_string(&d.city)),
            ("program", opt_string(&d.program)),
        ])
    }

    fn fields(_ctx: &()) -> Vec<Field> {
        vec![
            Field::new("document", "Documento de Identidad", FieldKind::Text)
                .placeholder("Ingrese el documento"),
            Field::new("firstname", "Nombre", FieldKind::Text).placeholder("Ingrese el nombre"),
            Field::new("lastname", "Apellido", FieldKind::Text).placeholder("Ingrese el apellido"),
            Field::new("phone", "Teléfono", FieldKind::Text).placeholder("3001234567"),
            Field::new("email", "Correo Electrónico", FieldKind::Email)
                .placeholder("correo@ejemplo.com"),
            Field::new("birthdate", "Fecha de Nacimiento", FieldKind::Date),
            Field::new("city", "Ciudad", FieldKind::Text).placeholder("Ciudad de residencia"),
            Field::new("program", "Programa", FieldKind::Text).placeholder("Programa de formación"),
        ]
    }

    fn columns() -> &'static [&'static str] {
        &["Documento", "Nombre", "Apellido", "Correo", "Ciudad"]
    }

    fn cells(&self) -> Vec<Cell> {
        let d = &self.data;
        vec![
            Cell::text(&d.document),
            Cell::text(&d.firstname),
            Cell::text(&d.lastname),
            Cell::text(&d.email),
            Cell::opt(d.city.as_ref()),
        ]
    }

    fn summary(&self) -> Vec<(&'static str, Cell)> {
        let d = &self.data;
        vec![
            ("Documento de Identidad", Cell::text(&d.document)),
            ("Nombre", Cell::text(&d.firstname)),
            ("Apellido", Cell::text(&d.lastname)),
            ("Teléfono", Cell::opt(d.phone.as_ref())),
            ("Correo Electrónico", Cell::text(&d.email)),
            ("Fecha de Nacimiento", Cell::opt(d.birthdate)),
            ("Ciudad", Cell::opt(d.city.as_ref())),
            ("Programa", Cell::opt(d.program.as_ref())),
        ]
    }
}

use async_trait::async_trait;

use super::{form_data, opt_display, opt_string, Resource};
use crate::error::AppError;
use crate::forms::{FormData, FormErrors, ProgramaForm, Validated};
use crate::models::{Choice, EstadoPrograma, Modalidad, NivelFormacion, Programa, ProgramaData};
use crate::render::{options, Cell, Field, FieldKind};
use crate::store::Backend;

#[async_trait]
impl Resource for Programa {
    type Data = ProgramaData;
    type Context = ();

    const PATH: &'static str = "programas";
    const TITLE: &'static str = "Programas de Formación";
    const NOUN: &'static str = "el programa";
    const KEY_LABEL: &'static str = "el código";

    fn id(&self) -> i64 {
        self.id
    }

    fn data(&self) -> &ProgramaData {
        &self.data
    }

    fn from_parts(id: i64, data: ProgramaData) -> Self {
        Programa { id, data }
    }

    fn display(&self) -> String {
        format!("{} - {}", self.data.codigo, self.data.nombre)
    }

    fn natural_key(data: &ProgramaData) -> Option<&str> {
        Some(&data.codigo)
    }

    async fn context<B: Backend>(_backend: &B) -> Result<(), AppError> {
        Ok(())
    }

    fn validate(
        form: &FormData,
        _ctx: &(),
        _existing: Option<&Self>,
    ) -> Result<Validated<ProgramaData>, FormErrors> {
        ProgramaForm::validate(form)
    }

    fn blank() -> FormData {
        form_data(vec![("estado", EstadoPrograma::Activo.code().into())])
    }

    fn initial(&self) -> FormData {
        let d = &self.data;
        form_data(vec![
            ("codigo", d.codigo.clone()),
            ("nombre", d.nombre.clone()),
            ("nivel_formacion", d.nivel_formacion.code().to_string()),
            ("modalidad", d.modalidad.code().to_string()),
            ("duracion_meses", d.duracion_meses.to_string()),
            ("duracion_horas", d.duracion_horas.to_string()),
            ("descripcion", opt_string(&d.descripcion)),
            ("competencias", opt_string(&d.competencias)),
            ("perfil_egreso", opt_string(&d.perfil_egreso)),
            ("requisitos_ingreso", opt_string(&d.requisitos_ingreso)),
            ("centro_formacion", opt_string(&d.centro_formacion)),
            ("regional", opt_string(&d.regional)),
            ("estado", d.estado.code().to_string()),
            ("fecha_creacion", opt_display(&d.fecha_creacion)),
        ])
    }

    fn fields(_ctx: &()) -> Vec<Field> {
        vec![
            Field::new("codigo", "Código del Programa", FieldKind::Text)
                .placeholder("Ej: ADSI-2024-001"),
            Field::new("nombre", "Nombre del Programa", FieldKind::Text)
                .placeholder("Ingrese el nombre del programa"),
            Field::new("nivel_formacion", "Nivel de Formación", FieldKind::Select(options::<NivelFormacion>())),
            Field::new("modalidad", "Modalidad", FieldKind::Select(options::<Modalidad>())),
            Field::new("duracion_meses", "Duración en Meses", FieldKind::Number)
                .placeholder("Duración en meses"),
            Field::new("duracion_horas", "Duración en Horas", FieldKind::Number)
                .placeholder("Duración en horas"),
            Field::new("descripcion", "Descripción del Programa", FieldKind::TextArea { rows: 4 })
                .placeholder("Descripción general del programa"),
            Field::new("competencias", "Competencias a Desarrollar", FieldKind::TextArea { rows: 4 })
                .placeholder("Liste las competencias que desarrollará el aprendiz"),
            Field::new("perfil_egreso", "Perfil de Egreso", FieldKind::TextArea { rows: 4 })
                .placeholder("Describa el perfil del egresado"),
            Field::new("requisitos_ingreso", "Requisitos de Ingreso", FieldKind::TextArea { rows: 3 })
                .placeholder("Liste los requisitos para ingresar al programa"),
            Field::new("centro_formacion", "Centro de Formación", FieldKind::Text)
                .placeholder("Nombre del centro de formación"),
            Field::new("regional", "Regional", FieldKind::Text).placeholder("Regional SENA"),
            Field::new("estado", "Estado", FieldKind::Select(options::<EstadoPrograma>())),
            Field::new("fecha_creacion", "Fecha de Creación del Programa", FieldKind::Date),
        ]
    }

    fn columns() -> &'static [&'static str] {
        &["Código", "Nombre", "Nivel", "Modalidad", "Meses", "Estado"]
    }

    fn cells(&self) -> Vec<Cell> {
        let d = &self.data;
        vec![
            Cell::text(&d.codigo),
            Cell::text(&d.nombre),
            Cell::text(d.nivel_formacion.label()),
            Cell::text(d.modalidad.label()),
            Cell::text(d.duracion_meses),
            Cell::text(d.estado.label()),
        ]
    }

    fn summary(&self) -> Vec<(&'static str, Cell)> {
        let d = &self.data;
        vec![
            ("Código del Programa", Cell::text(&d.codigo)),
            ("Nombre del Programa", Cell::text(&d.nombre)),
            ("Nivel de Formación", Cell::text(d.nivel_formacion.label())),
            ("Modalidad", Cell::text(d.modalidad.label())),
            ("Duración en Meses", Cell::text(d.duracion_meses)),
            ("Duración en Horas", Cell::text(d.duracion_horas)),
            ("Descripción", Cell::opt(d.descripcion.as_ref())),
            ("Competencias", Cell::opt(d.competencias.as_ref())),
            ("Perfil de Egreso", Cell::opt(d.perfil_egreso.as_ref())),
            ("Requisitos de Ingreso", Cell::opt(d.requisitos_ingreso.as_ref())),
            ("Centro de Formación", Cell::opt(d.centro_formacion.as_ref())),
            ("Regional", Cell::opt(d.regional.as_ref())),
            ("Estado", Cell::text(d.estado.label())),
            ("Fecha de Creación", Cell::opt(d.fecha_creacion)),
        ]
    }
}

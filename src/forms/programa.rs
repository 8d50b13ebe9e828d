use super::{
    choice, codigo, integer, optional_date, optional_text, text, Cleaner, FormData, FormErrors,
    Validated,
};
use crate::models::{EstadoPrograma, Modalidad, NivelFormacion, ProgramaData};

/// Forty hours a week.
pub const HORAS_POR_MES: i32 = 160;

pub struct ProgramaForm;

impl ProgramaForm {
    pub fn validate(data: &FormData) -> Result<Validated<ProgramaData>, FormErrors> {
        let mut c = Cleaner::new(data);

        let codigo = c.field("codigo", codigo);
        let nombre = c.field("nombre", text);
        let nivel_formacion = c.field("nivel_formacion", choice::<NivelFormacion>);
        let modalidad = c.field("modalidad", choice::<Modalidad>);
        let duracion_meses = c.field("duracion_meses", clean_duracion_meses);
        let duracion_horas = c.field("duracion_horas", clean_duracion_horas);
        let descripcion = c.field("descripcion", optional_text);
        let competencias = c.field("competencias", optional_text);
        let perfil_egreso = c.field("perfil_egreso", optional_text);
        let requisitos_ingreso = c.field("requisitos_ingreso", optional_text);
        let centro_formacion = c.field("centro_formacion", optional_text);
        let regional = c.field("regional", optional_text);
        let estado = c.field("estado", choice::<EstadoPrograma>);
        let fecha_creacion = c.field("fecha_creacion", optional_date);

        if let (Some(meses), Some(horas)) = (duracion_meses, duracion_horas) {
            let estimadas = f64::from(meses * HORAS_POR_MES);
            let horas = f64::from(horas);
            if horas > estimadas * 2.0 {
                c.advise(
                    "duracion_horas",
                    format!("Las horas parecen muy altas para {meses} meses. Verifique."),
                );
            } else if horas < estimadas * 0.25 {
                c.advise(
                    "duracion_horas",
                    format!("Las horas parecen muy bajas para {meses} meses. Verifique."),
                );
            }
        }

        let value = (|| {
            Some(ProgramaData {
                codigo: codigo?,
                nombre: nombre?,
                nivel_formacion: nivel_formacion?,
                modalidad: modalidad?,
                duracion_meses: duracion_meses?,
                duracion_horas: duracion_horas?,
                descripcion: descripcion?,
                competencias: competencias?,
                perfil_egreso: perfil_egreso?,
                requisitos_ingreso: requisitos_ingreso?,
                centro_formacion: centro_formacion?,
                regional: regional?,
                estado: estado?,
                fecha_creacion: fecha_creacion?,
            })
        })();
        c.finish(value)
    }
}

fn clean_duracion_meses(raw: &str) -> Result<i32, String> {
    let meses = integer(raw)?;
    if meses < 1 {
        return Err("La duración debe ser al menos 1 mes.".into());
    }
    if meses > 60 {
        return Err("La duración parece demasiado larga. Verifique el dato.".into());
    }
    Ok(meses)
}

fn clean_duracion_horas(raw: &str) -> Result<i32, String> {
    let horas = integer(raw)?;
    if horas < 40 {
        return Err("La duración debe ser al menos 40 horas.".into());
    }
    if horas > 10_000 {
        return Err("La duración parece demasiado larga. Verifique el dato.".into());
    }
    Ok(horas)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forms::{form, AdvisoryPolicy};

    fn submission(overrides: &[(&'static str, &'static str)]) -> FormData {
        let mut pairs = vec![
            ("codigo", "adso-2024"),
            ("nombre", "Análisis y Desarrollo de Software"),
            ("nivel_formacion", "TECNOL"),
            ("modalidad", "PRES"),
            ("duracion_meses", "24"),
            ("duracion_horas", "3840"),
            ("estado", "ACT"),
            ("fecha_creacion", "2024-01-15"),
        ];
        for (k, v) in overrides {
            pairs.retain(|(name, _)| name != k);
            pairs.push((k, v));
        }
        form(&pairs)
    }

    fn blocking(data: &FormData) -> Result<Validated<ProgramaData>, FormErrors> {
        ProgramaForm::validate(data).and_then(|v| AdvisoryPolicy::Block.enforce(v))
    }

    #[test]
    fn normalizes_codigo() {
        let v = blocking(&submission(&[("codigo", "  adso-2024 ")])).unwrap();
        assert_eq!(v.value.codigo, "ADSO-2024");
        assert_eq!(v.value.descripcion, None);
    }

    #[test]
    fn rejects_markup_in_codigo() {
        let errs = blocking(&submission(&[("codigo", "AD<SO")])).unwrap_err();
        assert_eq!(errs.field("codigo"), vec!["El código contiene caracteres no permitidos."]);
        let errs = blocking(&submission(&[("codigo", "")])).unwrap_err();
        assert_eq!(errs.field("codigo"), vec!["El código es obligatorio."]);
    }

    #[test]
    fn month_bounds() {
        assert!(blocking(&submission(&[("duracion_meses", "0")])).unwrap_err().has_field("duracion_meses"));
        assert!(blocking(&submission(&[("duracion_meses", "61")])).unwrap_err().has_field("duracion_meses"));
        assert!(blocking(&submission(&[("duracion_meses", "1"), ("duracion_horas", "160")])).is_ok());
    }

    #[test]
    fn hour_bounds() {
        let errs = blocking(&submission(&[("duracion_horas", "39")])).unwrap_err();
        assert_eq!(errs.field("duracion_horas"), vec!["La duración debe ser al menos 40 horas."]);
        assert!(blocking(&submission(&[("duracion_horas", "10001")])).unwrap_err().has_field("duracion_horas"));
    }

    #[test]
    fn hours_out_of_proportion_are_advisory() {
        // 2 months -> 320 estimated hours; 641 is above twice that.
        let data = submission(&[("duracion_meses", "2"), ("duracion_horas", "641")]);
        let v = ProgramaForm::validate(&data).unwrap();
        assert_eq!(v.advisories.len(), 1);
        assert_eq!(v.advisories[0].field, "duracion_horas");

        let errs = blocking(&data).unwrap_err();
        assert_eq!(errs.field("duracion_horas"), vec!["Las horas parecen muy altas para 2 meses. Verifique."]);

        let low = blocking(&submission(&[("duracion_meses", "2"), ("duracion_horas", "79")])).unwrap_err();
        assert_eq!(low.field("duracion_horas"), vec!["Las horas parecen muy bajas para 2 meses. Verifique."]);

        assert!(blocking(&submission(&[("duracion_meses", "2"), ("duracion_horas", "640")])).is_ok());
        assert!(blocking(&submission(&[("duracion_meses", "2"), ("duracion_horas", "80")])).is_ok());
    }

    #[test]
    fn warn_policy_lets_advisories_through() {
        let data = submission(&[("duracion_meses", "2"), ("duracion_horas", "900")]);
        let v = ProgramaForm::validate(&data)
            .and_then(|v| AdvisoryPolicy::Warn.enforce(v))
            .unwrap();
        assert_eq!(v.value.duracion_horas, 900);
        assert_eq!(v.advisories.len(), 1);
    }

    #[test]
    fn unknown_estado_is_an_invalid_choice() {
        let errs = blocking(&submission(&[("estado", "XYZ")])).unwrap_err();
        assert_eq!(errs.field("estado"), vec![crate::forms::INVALID_CHOICE]);
    }
}

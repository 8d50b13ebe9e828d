use super::{
    checkbox, choice, date, email, integer, is_digits, optional_text, phone, text, Cleaner,
    FormData, FormErrors, Validated,
};
use crate::models::{InstructorData, NivelEducativo, TipoDocumento};

pub const MAX_ANOS_EXPERIENCIA: i32 = 50;

pub struct InstructorForm;

impl InstructorForm {
    pub fn validate(data: &FormData) -> Result<Validated<InstructorData>, FormErrors> {
        let mut c = Cleaner::new(data);

        let tipo_documento = c.field("tipo_documento", choice::<TipoDocumento>);
        let documento_id = c.field("documento_id", |raw| clean_documento_id(raw, tipo_documento));
        let nombre = c.field("nombre", text);
        let apellido = c.field("apellido", text);
        let telefono = c.field("telefono", phone);
        let correo = c.field("correo", email);
        let fecha_nacimiento = c.field("fecha_nacimiento", date);
        let ciudad = c.field("ciudad", optional_text);
        let direccion = c.field("direccion", optional_text);
        let nivel_educativo = c.field("nivel_educativo", choice::<NivelEducativo>);
        let especialidad = c.field("especialidad", optional_text);
        let anos_experiencia = c.field("anos_experiencia", clean_anos_experiencia);
        let activo = c.field("activo", checkbox);
        let fecha_vinculacion = c.field("fecha_vinculacion", date);

        if let (Some(nacimiento), Some(vinculacion)) = (fecha_nacimiento, fecha_vinculacion) {
            if vinculacion <= nacimiento {
                c.reject("La fecha de vinculación debe ser posterior a la fecha de nacimiento.");
            }
        }

        let value = (|| {
            Some(InstructorData {
                tipo_documento: tipo_documento?,
                documento_id: documento_id?,
                nombre: nombre?,
                apellido: apellido?,
                telefono: telefono?,
                correo: correo?,
                fecha_nacimiento: fecha_nacimiento?,
                ciudad: ciudad?,
                direccion: direccion?,
                nivel_educativo: nivel_educativo?,
                especialidad: especialidad?,
                anos_experiencia: anos_experiencia?,
                activo: activo?,
                fecha_vinculacion: fecha_vinculacion?,
            })
        })();
        c.finish(value)
    }
}

// Only numeric document kinds are checked; passports may carry letters.
fn clean_documento_id(raw: &str, tipo: Option<TipoDocumento>) -> Result<String, String> {
    let documento_id = text(raw)?;
    if tipo.is_some_and(TipoDocumento::is_numeric) && !is_digits(&documento_id) {
        return Err("El documento debe contener solo números.".into());
    }
    Ok(documento_id)
}

fn clean_anos_experiencia(raw: &str) -> Result<i32, String> {
    let anos = integer(raw)?;
    if anos < 0 {
        return Err("Los años de experiencia no pueden ser negativos.".into());
    }
    if anos > MAX_ANOS_EXPERIENCIA {
        return Err("Los años de experiencia parecen demasiado altos.".into());
    }
    Ok(anos)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forms::form;

    fn submission(overrides: &[(&'static str, &'static str)]) -> FormData {
        let mut pairs = vec![
            ("tipo_documento", "CC"),
            ("documento_id", "71234567"),
            ("nombre", "Carlos"),
            ("apellido", "Restrepo"),
            ("telefono", "3109876543"),
            ("correo", "carlos@sena.edu.co"),
            ("fecha_nacimiento", "1985-03-02"),
            ("ciudad", "Bogotá"),
            ("direccion", "Calle 1 # 2-3"),
            ("nivel_educativo", "PROF"),
            ("especialidad", "Software"),
            ("anos_experiencia", "12"),
            ("activo", "on"),
            ("fecha_vinculacion", "2015-01-20"),
        ];
        for (k, v) in overrides {
            pairs.retain(|(name, _)| name != k);
            pairs.push((k, v));
        }
        form(&pairs)
    }

    #[test]
    fn accepts_valid_instructor() {
        let v = InstructorForm::validate(&submission(&[])).unwrap().value;
        assert_eq!(v.tipo_documento, TipoDocumento::Cc);
        assert!(v.activo);
        assert_eq!(v.anos_experiencia, 12);
    }

    #[test]
    fn bad_document_and_dates_are_both_reported() {
        let errs = InstructorForm::validate(&submission(&[
            ("tipo_documento", "CC"),
            ("documento_id", "12A45"),
            ("fecha_nacimiento", "1990-01-01"),
            ("fecha_vinculacion", "1989-01-01"),
        ]))
        .unwrap_err();
        assert_eq!(errs.len(), 2);
        assert_eq!(errs.field("documento_id"), vec!["El documento debe contener solo números."]);
        assert_eq!(
            errs.non_field(),
            ["La fecha de vinculación debe ser posterior a la fecha de nacimiento.".to_string()]
        );
    }

    #[test]
    fn passport_numbers_may_contain_letters() {
        let v = InstructorForm::validate(&submission(&[
            ("tipo_documento", "PAS"),
            ("documento_id", "AB12345"),
        ]))
        .unwrap();
        assert_eq!(v.value.documento_id, "AB12345");
    }

    #[test]
    fn same_day_vinculacion_is_rejected() {
        let errs = InstructorForm::validate(&submission(&[
            ("fecha_nacimiento", "1990-01-01"),
            ("fecha_vinculacion", "1990-01-01"),
        ]))
        .unwrap_err();
        assert_eq!(errs.non_field().len(), 1);
    }

    #[test]
    fn experience_is_capped() {
        assert!(InstructorForm::validate(&submission(&[("anos_experiencia", "50")])).is_ok());
        let errs = InstructorForm::validate(&submission(&[("anos_experiencia", "51")])).unwrap_err();
        assert!(errs.has_field("anos_experiencia"));
    }

    #[test]
    fn unchecked_activo_is_false() {
        let mut data = submission(&[]);
        data.remove("activo");
        assert!(!InstructorForm::validate(&data).unwrap().value.activo);
    }

    #[test]
    fn telefono_length() {
        let errs = InstructorForm::validate(&submission(&[("telefono", "310987654")])).unwrap_err();
        assert_eq!(errs.field("telefono"), vec!["El teléfono debe tener 10 dígitos."]);
    }
}

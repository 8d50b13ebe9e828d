//! Validation and normalization of submitted form data.
//!
//! A form runs in two phases. The field phase coerces each raw value and
//! applies that field's own rules; a field that fails is left out of the
//! cleaned set. The cross-field phase then runs every rule whose inputs all
//! survived the field phase. Hard failures become errors, soft failures
//! become advisories attached to one field.

use chrono::NaiveDate;
use std::collections::HashMap;
use std::str::FromStr;
use validator::ValidateEmail;

use crate::models::Choice;

pub mod aprendiz;
pub mod curso;
pub mod instructor;
pub mod programa;

pub use aprendiz::AprendizForm;
pub use curso::{AprendizCursoForm, CursoForm, InstructorCursoForm};
pub use instructor::InstructorForm;
pub use programa::ProgramaForm;

/// Raw submitted values keyed by field name.
pub type FormData = HashMap<String, String>;

pub const REQUIRED: &str = "Este campo es obligatorio.";
pub const INVALID_CHOICE: &str = "Seleccione una opción válida.";
pub const INVALID_INTEGER: &str = "Introduzca un número entero.";
pub const INVALID_NUMBER: &str = "Introduzca un número.";
pub const INVALID_DATE: &str = "Introduzca una fecha válida.";
pub const INVALID_EMAIL: &str = "Introduzca una dirección de correo electrónico válida.";

/// Messages produced by a failed validation, per field and form-wide.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormErrors {
    fields: Vec<(&'static str, String)>,
    non_field: Vec<String>,
}

impl FormErrors {
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.fields.push((field, message.into()));
    }

    pub fn add_non_field(&mut self, message: impl Into<String>) {
        self.non_field.push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.non_field.is_empty()
    }

    /// Total number of messages.
    pub fn len(&self) -> usize {
        self.fields.len() + self.non_field.len()
    }

    pub fn field(&self, name: &str) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|(f, _)| *f == name)
            .map(|(_, m)| m.as_str())
            .collect()
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.fields.iter().any(|(f, _)| *f == name)
    }

    pub fn non_field(&self) -> &[String] {
        &self.non_field
    }
}

/// A soft validation message. Whether it blocks the save is decided by
/// [`AdvisoryPolicy`].
#[derive(Debug, Clone, PartialEq)]
pub struct Advisory {
    pub field: &'static str,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Validated<T> {
    pub value: T,
    pub advisories: Vec<Advisory>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AdvisoryPolicy {
    /// Advisories are reported as field errors and the save is refused.
    #[default]
    Block,
    /// Advisories are reported as warnings and the save proceeds.
    Warn,
}

impl AdvisoryPolicy {
    pub fn enforce<T>(self, validated: Validated<T>) -> Result<Validated<T>, FormErrors> {
        if self == AdvisoryPolicy::Warn || validated.advisories.is_empty() {
            return Ok(validated);
        }
        let mut errors = FormErrors::default();
        for a in validated.advisories {
            errors.add(a.field, a.message);
        }
        Err(errors)
    }
}

impl FromStr for AdvisoryPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "block" => Ok(AdvisoryPolicy::Block),
            "warn" => Ok(AdvisoryPolicy::Warn),
            other => Err(format!("expected `block` or `warn`, got `{other}`")),
        }
    }
}

/// Accumulates results while a single submission is cleaned.
pub struct Cleaner<'a> {
    data: &'a FormData,
    errors: FormErrors,
    advisories: Vec<Advisory>,
}

impl<'a> Cleaner<'a> {
    pub fn new(data: &'a FormData) -> Self {
        Self {
            data,
            errors: FormErrors::default(),
            advisories: Vec::new(),
        }
    }

    /// Runs one field through `clean`. Returns `None` when it failed, in which
    /// case the message has been recorded against the field.
    pub fn field<T>(
        &mut self,
        name: &'static str,
        clean: impl FnOnce(&str) -> Result<T, String>,
    ) -> Option<T> {
        let raw = self.data.get(name).map(|v| v.trim()).unwrap_or("");
        match clean(raw) {
            Ok(v) => Some(v),
            Err(msg) => {
                self.errors.add(name, msg);
                None
            }
        }
    }

    pub fn add_error(&mut self, field: &'static str, message: impl Into<String>) {
        self.errors.add(field, message);
    }

    pub fn reject(&mut self, message: impl Into<String>) {
        self.errors.add_non_field(message);
    }

    pub fn advise(&mut self, field: &'static str, message: impl Into<String>) {
        self.advisories.push(Advisory {
            field,
            message: message.into(),
        });
    }

    /// Closes the form. Hard errors win; advisories raised alongside them are
    /// reported as field errors so the user sees everything at once.
    pub fn finish<T>(self, value: Option<T>) -> Result<Validated<T>, FormErrors> {
        let Cleaner {
            mut errors,
            advisories,
            ..
        } = self;
        match value {
            Some(value) if errors.is_empty() => Ok(Validated { value, advisories }),
            _ => {
                for a in advisories {
                    errors.add(a.field, a.message);
                }
                Err(errors)
            }
        }
    }
}

// --- coercers ---

pub fn required(raw: &str) -> Result<&str, String> {
    if raw.is_empty() {
        Err(REQUIRED.into())
    } else {
        Ok(raw)
    }
}

pub fn text(raw: &str) -> Result<String, String> {
    required(raw).map(str::to_owned)
}

pub fn optional_text(raw: &str) -> Result<Option<String>, String> {
    Ok((!raw.is_empty()).then(|| raw.to_owned()))
}

pub fn integer(raw: &str) -> Result<i32, String> {
    required(raw)?.parse().map_err(|_| INVALID_INTEGER.to_string())
}

pub fn id(raw: &str) -> Result<i64, String> {
    required(raw)?.parse().map_err(|_| INVALID_CHOICE.to_string())
}

pub fn optional_decimal(raw: &str) -> Result<Option<f64>, String> {
    if raw.is_empty() {
        return Ok(None);
    }
    match raw.replace(',', ".").parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(Some(v)),
        _ => Err(INVALID_NUMBER.into()),
    }
}

pub fn date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(required(raw)?, "%Y-%m-%d").map_err(|_| INVALID_DATE.to_string())
}

pub fn optional_date(raw: &str) -> Result<Option<NaiveDate>, String> {
    if raw.is_empty() {
        return Ok(None);
    }
    date(raw).map(Some)
}

pub fn choice<C: Choice>(raw: &str) -> Result<C, String> {
    C::from_code(required(raw)?).ok_or_else(|| INVALID_CHOICE.to_string())
}

/// Resolves a submitted id against the rows offered in a selection list.
pub fn related<'o, T>(
    raw: &str,
    options: &'o [T],
    id_of: impl Fn(&T) -> i64,
) -> Result<&'o T, String> {
    let wanted = id(raw)?;
    options
        .iter()
        .find(|o| id_of(o) == wanted)
        .ok_or_else(|| INVALID_CHOICE.to_string())
}

pub fn checkbox(raw: &str) -> Result<bool, String> {
    Ok(!matches!(
        raw.to_ascii_lowercase().as_str(),
        "" | "false" | "off" | "0"
    ))
}

pub fn email(raw: &str) -> Result<String, String> {
    let value = required(raw)?;
    // Bare hosts such as `ana@sena` are refused; the domain needs a dot.
    let dotted = value
        .rsplit_once('@')
        .is_some_and(|(_, domain)| domain.contains('.'));
    if dotted && value.validate_email() {
        Ok(value.to_owned())
    } else {
        Err(INVALID_EMAIL.into())
    }
}

pub fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}

/// Shared rule for Colombian mobile numbers: digits only, exactly ten.
pub fn phone(raw: &str) -> Result<Option<String>, String> {
    if raw.is_empty() {
        return Ok(None);
    }
    if !is_digits(raw) {
        return Err("El teléfono debe contener solo números.".into());
    }
    if raw.chars().count() != 10 {
        return Err("El teléfono debe tener 10 dígitos.".into());
    }
    Ok(Some(raw.to_owned()))
}

/// Shared rule for program and course codes: required, upper-cased, no
/// markup characters.
pub fn codigo(raw: &str) -> Result<String, String> {
    if raw.is_empty() {
        return Err("El código es obligatorio.".into());
    }
    let codigo = raw.to_uppercase().trim().to_owned();
    if codigo.chars().any(|c| matches!(c, '<' | '>' | '"' | '\'')) {
        return Err("El código contiene caracteres no permitidos.".into());
    }
    Ok(codigo)
}

#[cfg(test)]
pub(crate) fn form(pairs: &[(&str, &str)]) -> FormData {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phone_requires_exactly_ten_digits() {
        assert_eq!(phone("3001234567"), Ok(Some("3001234567".into())));
        assert!(phone("300123456").is_err());
        assert!(phone("30012345678").is_err());
        assert!(phone("300-123456").is_err());
        assert_eq!(phone(""), Ok(None));
    }

    #[test]
    fn codigo_is_trimmed_and_upper_cased() {
        assert_eq!(codigo("adsi-01"), Ok("ADSI-01".into()));
        for bad in ["<x", "a>b", "a\"b", "it's"] {
            assert!(codigo(bad).is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn cleaner_trims_raw_values() {
        let data = form(&[("codigo", "  adsi-01 ")]);
        let mut c = Cleaner::new(&data);
        assert_eq!(c.field("codigo", codigo).as_deref(), Some("ADSI-01"));
    }

    #[test]
    fn checkbox_treats_missing_as_false() {
        assert_eq!(checkbox(""), Ok(false));
        assert_eq!(checkbox("on"), Ok(true));
        assert_eq!(checkbox("false"), Ok(false));
    }

    #[test]
    fn email_shape() {
        assert!(email("ana@sena.edu.co").is_ok());
        assert!(email("ana@sena").is_err());
        assert!(email("ana.sena.edu.co").is_err());
        assert!(email("").is_err());
    }

    #[test]
    fn email_rejects_malformed_domains() {
        for bad in ["ana@sena..co", "ana@-sena.co", "ana@sena.co,", "a@b.c!", "ana @sena.co"] {
            assert_eq!(email(bad), Err(INVALID_EMAIL.to_string()), "{bad}");
        }
        assert_eq!(email("Ana.Ruiz@sena.edu.co").as_deref(), Ok("Ana.Ruiz@sena.edu.co"));
    }

    #[test]
    fn block_policy_turns_advisories_into_errors() {
        let v = Validated {
            value: 1,
            advisories: vec![Advisory {
                field: "fecha_fin",
                message: "larga".into(),
            }],
        };
        let errs = AdvisoryPolicy::Block.enforce(v.clone()).unwrap_err();
        assert_eq!(errs.field("fecha_fin"), vec!["larga"]);
        assert!(AdvisoryPolicy::Warn.enforce(v).is_ok());
    }

    #[test]
    fn policy_parses_from_env_values() {
        assert_eq!("WARN".parse::<AdvisoryPolicy>(), Ok(AdvisoryPolicy::Warn));
        assert_eq!("block".parse::<AdvisoryPolicy>(), Ok(AdvisoryPolicy::Block));
        assert!("maybe".parse::<AdvisoryPolicy>().is_err());
    }
}

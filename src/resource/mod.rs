//! The per-record-type parameters of the generic CRUD controller.

use async_trait::async_trait;

use crate::error::AppError;
use crate::forms::{FormData, FormErrors, Validated};
use crate::render::{Cell, Field, Section};
use crate::store::Backend;

mod aprendiz;
mod curso;
mod instructor;
mod programa;

/// A record type served under `/{PATH}/`.
#[async_trait]
pub trait Resource: Clone + Send + Sync + Sized + 'static {
    /// The editable columns, everything but the primary key.
    type Data: Clone + Send + Sync + 'static;
    /// Lookups the form needs, such as selection lists.
    type Context: Send + Sync;

    const PATH: &'static str;
    const TITLE: &'static str;
    /// Singular with its article, e.g. "el curso".
    const NOUN: &'static str;
    const FEMININE: bool = false;
    /// Name of the unique business key, with its article.
    const KEY_LABEL: &'static str = "la clave";

    fn id(&self) -> i64;
    fn data(&self) -> &Self::Data;
    fn from_parts(id: i64, data: Self::Data) -> Self;
    fn display(&self) -> String;

    /// Value of the unique business key, if the table has one.
    fn natural_key(_data: &Self::Data) -> Option<&str> {
        None
    }

    async fn context<B: Backend>(backend: &B) -> Result<Self::Context, AppError>;

    fn validate(
        form: &FormData,
        ctx: &Self::Context,
        existing: Option<&Self>,
    ) -> Result<Validated<Self::Data>, FormErrors>;

    /// Form values for a new record.
    fn blank() -> FormData {
        FormData::new()
    }

    /// Form values for editing this record.
    fn initial(&self) -> FormData;
    fn fields(ctx: &Self::Context) -> Vec<Field>;

    fn columns() -> &'static [&'static str];
    fn cells(&self) -> Vec<Cell>;
    fn summary(&self) -> Vec<(&'static str, Cell)>;

    async fn related<B: Backend>(&self, _backend: &B) -> Result<Vec<Section>, AppError> {
        Ok(Vec::new())
    }

    fn created_message(&self) -> String {
        format!(
            "{} «{}» ha sido {} exitosamente.",
            capitalize(Self::NOUN),
            self.display(),
            participle("registrad", Self::FEMININE)
        )
    }

    fn updated_message(&self) -> String {
        format!(
            "{} «{}» ha sido {} exitosamente.",
            capitalize(Self::NOUN),
            self.display(),
            participle("actualizad", Self::FEMININE)
        )
    }

    fn duplicate_message(key: &str) -> String {
        format!("Ya existe un registro con {} «{key}».", Self::KEY_LABEL)
    }

    fn deleted_message(&self) -> String {
        format!(
            "{} «{}» ha sido {} exitosamente.",
            capitalize(Self::NOUN),
            self.display(),
            participle("eliminad", Self::FEMININE)
        )
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn participle(stem: &str, feminine: bool) -> String {
    format!("{stem}{}", if feminine { 'a' } else { 'o' })
}

fn opt_string(v: &Option<String>) -> String {
    v.clone().unwrap_or_default()
}

fn opt_display<T: ToString>(v: &Option<T>) -> String {
    v.as_ref().map(ToString::to_string).unwrap_or_default()
}

fn form_data(pairs: Vec<(&'static str, String)>) -> FormData {
    pairs.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
}

fn link<R: Resource>(id: i64, text: impl Into<String>) -> Cell {
    Cell::link(format!("/{}/{}/", R::PATH, id), text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capitalizes_accented_nouns() {
        assert_eq!(capitalize("la inscripción"), "La inscripción");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn participle_agrees_with_gender() {
        assert_eq!(participle("registrad", false), "registrado");
        assert_eq!(participle("eliminad", true), "eliminada");
    }

    #[test]
    fn duplicate_message_names_the_business_key() {
        use crate::models::{Aprendiz, Programa};
        assert_eq!(
            Aprendiz::duplicate_message("1001"),
            "Ya existe un registro con el documento «1001»."
        );
        assert_eq!(
            Programa::duplicate_message("ADSO-01"),
            "Ya existe un registro con el código «ADSO-01»."
        );
    }
}

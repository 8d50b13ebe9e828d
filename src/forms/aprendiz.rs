use super::{email, is_digits, optional_date, optional_text, phone, text, Cleaner, FormData, FormErrors, Validated};
use crate::models::AprendizData;

pub struct AprendizForm;

impl AprendizForm {
    pub fn validate(data: &FormData) -> Result<Validated<AprendizData>, FormErrors> {
        let mut c = Cleaner::new(data);

        let document = c.field("document", clean_document);
        let firstname = c.field("firstname", text);
        let lastname = c.field("lastname", text);
        let phone = c.field("phone", phone);
        let email = c.field("email", email);
        let birthdate = c.field("birthdate", optional_date);
        let city = c.field("city", optional_text);
        let program = c.field("program", optional_text);

        let value = (|| {
            Some(AprendizData {
                document: document?,
                firstname: firstname?,
                lastname: lastname?,
                phone: phone?,
                email: email?,
                birthdate: birthdate?,
                city: city?,
                program: program?,
            })
        })();
        c.finish(value)
    }
}

fn clean_document(raw: &str) -> Result<String, String> {
    let document = text(raw)?;
    if !is_digits(&document) {
        return Err("El documento debe contener solo números.".into());
    }
    Ok(document)
}

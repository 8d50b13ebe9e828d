//! One-shot notifications carried across a redirect in a cookie.

use axum_extra::extract::cookie::{Cookie, CookieJar};
use percent_encoding::{percent_decode_str, utf8_percent_encode, NON_ALPHANUMERIC};

const COOKIE: &str = "sena_flash";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Success,
    Warning,
    Error,
}

impl Level {
    pub fn as_str(self) -> &'static str {
        match self {
            Level::Success => "success",
            Level::Warning => "warning",
            Level::Error => "error",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s {
            "success" => Some(Level::Success),
            "warning" => Some(Level::Warning),
            "error" => Some(Level::Error),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flash {
    pub level: Level,
    pub message: String,
}

impl Flash {
    pub fn success(message: impl Into<String>) -> Self {
        Self { level: Level::Success, message: message.into() }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self { level: Level::Warning, message: message.into() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { level: Level::Error, message: message.into() }
    }
}

fn encode(flashes: &[Flash]) -> String {
    flashes
        .iter()
        .map(|f| {
            format!(
                "{}.{}",
                f.level.as_str(),
                utf8_percent_encode(&f.message, NON_ALPHANUMERIC)
            )
        })
        .collect::<Vec<_>>()
        .join("~")
}

fn decode(value: &str) -> Vec<Flash> {
    value
        .split('~')
        .filter_map(|item| {
            let (level, message) = item.split_once('.')?;
            Some(Flash {
                level: Level::parse(level)?,
                message: percent_decode_str(message).decode_utf8().ok()?.into_owned(),
            })
        })
        .collect()
}

/// Queues messages for the next rendered page.
pub fn push(jar: CookieJar, flashes: &[Flash]) -> CookieJar {
    if flashes.is_empty() {
        return jar;
    }
    let mut cookie = Cookie::new(COOKIE, encode(flashes));
    cookie.set_path("/");
    cookie.set_http_only(true);
    jar.add(cookie)
}

/// Reads and clears pending messages.
pub fn take(jar: CookieJar) -> (CookieJar, Vec<Flash>) {
    let Some(value) = jar.get(COOKIE).map(|c| c.value().to_owned()) else {
        return (jar, Vec::new());
    };
    let mut removal = Cookie::from(COOKIE);
    removal.set_path("/");
    (jar.remove(removal), decode(&value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_survive_the_cookie_encoding() {
        let flashes = vec![
            Flash::success("El curso \"Cocina\" (Código: C-1) ha sido registrado exitosamente."),
            Flash::warning("Las horas parecen muy altas para 2 meses. Verifique."),
        ];
        let value = encode(&flashes);
        assert!(!value.contains(' '));
        assert!(!value.contains(';'));
        assert_eq!(decode(&value), flashes);
    }

    #[test]
    fn garbage_is_ignored() {
        assert!(decode("nonsense").is_empty());
        assert!(decode("info.hola").is_empty());
    }

    #[test]
    fn take_clears_the_cookie() {
        let jar = push(CookieJar::new(), &[Flash::error("x")]);
        let (jar, flashes) = take(jar);
        assert_eq!(flashes, vec![Flash::error("x")]);
        assert!(jar.get(COOKIE).is_none());
    }
}

//! Server-side HTML for every page the controller produces.

use http::StatusCode;
use std::fmt::Write;

use crate::flash::Flash;
use crate::forms::{FormData, FormErrors};
use crate::models::{Choice, Totales};
use crate::resource::Resource;

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Link { href: String, text: String },
    Empty,
}

impl Cell {
    pub fn text(value: impl ToString) -> Self {
        Cell::Text(value.to_string())
    }

    pub fn opt<T: ToString>(value: Option<T>) -> Self {
        value.map_or(Cell::Empty, |v| Cell::Text(v.to_string()))
    }

    pub fn link(href: impl Into<String>, text: impl Into<String>) -> Self {
        Cell::Link {
            href: href.into(),
            text: text.into(),
        }
    }

    fn html(&self) -> String {
        match self {
            Cell::Text(t) => escape(t),
            Cell::Link { href, text } => {
                format!("<a href=\"{}\">{}</a>", escape(href), escape(text))
            }
            Cell::Empty => "&mdash;".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    Text,
    Email,
    Date,
    Number,
    Decimal,
    TextArea { rows: u8 },
    Checkbox,
    Select(Vec<(String, String)>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub placeholder: Option<&'static str>,
}

impl Field {
    pub fn new(name: &'static str, label: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            label,
            kind,
            placeholder: None,
        }
    }

    pub fn placeholder(mut self, text: &'static str) -> Self {
        self.placeholder = Some(text);
        self
    }
}

/// A related-records table shown under a detail view.
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub title: String,
    pub columns: Vec<&'static str>,
    pub rows: Vec<Vec<Cell>>,
}

pub fn options<C: Choice>() -> Vec<(String, String)> {
    C::all()
        .iter()
        .map(|c| (c.code().to_string(), c.label().to_string()))
        .collect()
}

pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            c => out.push(c),
        }
    }
    out
}

fn layout(title: &str, flashes: &[Flash], body: &str) -> String {
    let mut notices = String::new();
    for f in flashes {
        let _ = write!(
            notices,
            "<div class=\"alert alert-{}\">{}</div>",
            f.level.as_str(),
            escape(&f.message)
        );
    }
    format!(
        r#"<!DOCTYPE html>
<html lang="es">
<head>
  <meta charset="utf-8"/>
  <title>{title} | SENA</title>
</head>
<body>
<nav>
  <a href="/">Inicio</a> |
  <a href="/aprendices/">Aprendices</a> |
  <a href="/instructores/">Instructores</a> |
  <a href="/programas/">Programas</a> |
  <a href="/cursos/">Cursos</a> |
  <a href="/asignaciones/">Asignaciones</a> |
  <a href="/inscripciones/">Inscripciones</a>
</nav>
{notices}
<main>
<h1>{title}</h1>
{body}
</main>
</body>
</html>"#,
        title = escape(title),
    )
}

pub fn home(totales: &Totales, flashes: &[Flash]) -> String {
    let body = format!(
        "<ul>\
         <li>Instructores: <strong>{}</strong></li>\
         <li>Aprendices: <strong>{}</strong></li>\
         <li>Programas: <strong>{}</strong></li>\
         <li>Cursos: <strong>{}</strong></li>\
         </ul>",
        totales.instructores, totales.aprendices, totales.programas, totales.cursos
    );
    layout("Sistema de Gestión SENA", flashes, &body)
}

fn table(columns: &[&str], rows: &[Vec<Cell>]) -> String {
    let mut html = String::from("<table><thead><tr>");
    for c in columns {
        let _ = write!(html, "<th>{}</th>", escape(c));
    }
    html.push_str("</tr></thead><tbody>");
    for row in rows {
        html.push_str("<tr>");
        for cell in row {
            let _ = write!(html, "<td>{}</td>", cell.html());
        }
        html.push_str("</tr>");
    }
    html.push_str("</tbody></table>");
    html
}

pub fn list<R: Resource>(rows: &[R], flashes: &[Flash]) -> String {
    let mut columns = R::columns().to_vec();
    columns.push("");
    let cells: Vec<Vec<Cell>> = rows
        .iter()
        .map(|r| {
            let mut cells = r.cells();
            cells.push(Cell::link(format!("/{}/{}/", R::PATH, r.id()), "Ver"));
            cells
        })
        .collect();
    let body = format!(
        "<p>Total: <strong id=\"total\">{}</strong></p>\
         <p><a href=\"/{}/crear/\">Registrar</a></p>{}",
        rows.len(),
        R::PATH,
        table(&columns, &cells)
    );
    layout(R::TITLE, flashes, &body)
}

pub fn detail<R: Resource>(row: &R, sections: &[Section], flashes: &[Flash]) -> String {
    let mut body = String::from("<dl>");
    for (label, cell) in row.summary() {
        let _ = write!(body, "<dt>{}</dt><dd>{}</dd>", escape(label), cell.html());
    }
    body.push_str("</dl>");
    for s in sections {
        let _ = write!(body, "<h2>{}</h2>", escape(&s.title));
        if s.rows.is_empty() {
            body.push_str("<p>Sin registros.</p>");
        } else {
            body.push_str(&table(&s.columns, &s.rows));
        }
    }
    let _ = write!(
        body,
        "<p><a href=\"/{path}/{id}/editar/\">Editar</a> | \
         <a href=\"/{path}/{id}/eliminar/\">Eliminar</a> | \
         <a href=\"/{path}/\">Volver</a></p>",
        path = R::PATH,
        id = row.id()
    );
    layout(&row.display(), flashes, &body)
}

fn errors_for(errors: Option<&FormErrors>, name: &str) -> String {
    errors
        .map(|e| {
            e.field(name)
                .iter()
                .map(|m| format!("<span class=\"error\">{}</span>", escape(m)))
                .collect::<String>()
        })
        .unwrap_or_default()
}

fn input(field: &Field, value: &str) -> String {
    let name = field.name;
    let placeholder = field
        .placeholder
        .map(|p| format!(" placeholder=\"{}\"", escape(p)))
        .unwrap_or_default();
    let value = escape(value);
    match &field.kind {
        FieldKind::Text => format!("<input type=\"text\" name=\"{name}\" value=\"{value}\"{placeholder}/>"),
        FieldKind::Email => format!("<input type=\"email\" name=\"{name}\" value=\"{value}\"{placeholder}/>"),
        FieldKind::Date => format!("<input type=\"date\" name=\"{name}\" value=\"{value}\"/>"),
        FieldKind::Number => format!("<input type=\"number\" name=\"{name}\" value=\"{value}\"{placeholder}/>"),
        FieldKind::Decimal => format!(
            "<input type=\"number\" step=\"0.1\" min=\"0.0\" max=\"5.0\" name=\"{name}\" value=\"{value}\"{placeholder}/>"
        ),
        FieldKind::TextArea { rows } => {
            format!("<textarea name=\"{name}\" rows=\"{rows}\"{placeholder}>{value}</textarea>")
        }
        FieldKind::Checkbox => {
            let checked = if crate::forms::checkbox(&value).unwrap_or(false) { " checked" } else { "" };
            format!("<input type=\"checkbox\" name=\"{name}\" value=\"on\"{checked}/>")
        }
        FieldKind::Select(choices) => {
            let mut html = format!("<select name=\"{name}\"><option value=\"\">---------</option>");
            for (code, label) in choices {
                let selected = if escape(code) == value { " selected" } else { "" };
                let _ = write!(
                    html,
                    "<option value=\"{}\"{selected}>{}</option>",
                    escape(code),
                    escape(label)
                );
            }
            html.push_str("</select>");
            html
        }
    }
}

pub fn form(
    title: &str,
    action: &str,
    fields: &[Field],
    data: &FormData,
    errors: Option<&FormErrors>,
    flashes: &[Flash],
) -> String {
    let mut body = String::new();
    if let Some(errs) = errors {
        for m in errs.non_field() {
            let _ = write!(body, "<div class=\"error non-field\">{}</div>", escape(m));
        }
    }
    let _ = write!(body, "<form method=\"post\" action=\"{}\">", escape(action));
    for field in fields {
        let value = data.get(field.name).map(String::as_str).unwrap_or("");
        let _ = write!(
            body,
            "<p><label for=\"{name}\">{label}</label> {input} {errors}</p>",
            name = field.name,
            label = escape(field.label),
            input = input(field, value),
            errors = errors_for(errors, field.name),
        );
    }
    body.push_str("<button type=\"submit\">Guardar</button></form>");
    layout(title, flashes, &body)
}

pub fn confirm_delete<R: Resource>(row: &R) -> String {
    let body = format!(
        "<p>¿Está seguro de que desea eliminar <strong>{}</strong>?</p>\
         <form method=\"post\" action=\"/{path}/{id}/eliminar/\">\
         <button type=\"submit\" name=\"confirm\" value=\"yes\">Sí, eliminar</button> \
         <a href=\"/{path}/{id}/\">Cancelar</a></form>",
        escape(&row.display()),
        path = R::PATH,
        id = row.id()
    );
    layout(&format!("Eliminar {}", R::NOUN), &[], &body)
}

pub fn error_page(status: StatusCode, message: &str) -> String {
    let title = status.canonical_reason().unwrap_or("Error");
    layout(title, &[], &format!("<p>{}</p>", escape(message)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup() {
        assert_eq!(escape("<a href='x'>&\"</a>"), "&lt;a href=&#x27;x&#x27;&gt;&amp;&quot;&lt;/a&gt;");
    }

    #[test]
    fn select_marks_current_value() {
        let f = Field::new(
            "estado",
            "Estado",
            FieldKind::Select(vec![("ACT".into(), "Activo".into()), ("INA".into(), "Inactivo".into())]),
        );
        let html = input(&f, "INA");
        assert!(html.contains("<option value=\"INA\" selected>Inactivo</option>"));
        assert!(html.contains("<option value=\"ACT\">Activo</option>"));
    }

    #[test]
    fn form_shows_field_and_form_errors() {
        let mut errs = FormErrors::default();
        errs.add("codigo", "El código es obligatorio.");
        errs.add_non_field("Fechas inválidas.");
        let fields = vec![Field::new("codigo", "Código", FieldKind::Text)];
        let html = form("Crear", "/programas/crear/", &fields, &FormData::new(), Some(&errs), &[]);
        assert!(html.contains("El código es obligatorio."));
        assert!(html.contains("Fechas inválidas."));
    }
}

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A closed vocabulary stored as a short code column.
pub trait Choice: Copy + Send + Sync + 'static {
    fn all() -> &'static [Self];
    fn code(self) -> &'static str;
    fn label(self) -> &'static str;

    fn from_code(code: &str) -> Option<Self> {
        Self::all().iter().copied().find(|c| c.code() == code)
    }
}

#[derive(Error, Debug)]
#[error("unknown choice code `{0}`")]
pub struct UnknownChoice(pub String);

macro_rules! choices {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => ($code:literal, $label:literal)),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $code)] $variant),+
        }

        impl Choice for $name {
            fn all() -> &'static [Self] {
                &[$($name::$variant),+]
            }

            fn code(self) -> &'static str {
                match self {
                    $($name::$variant => $code),+
                }
            }

            fn label(self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }
        }

        impl TryFrom<String> for $name {
            type Error = UnknownChoice;

            fn try_from(code: String) -> Result<Self, Self::Error> {
                <$name as Choice>::from_code(&code).ok_or(UnknownChoice(code))
            }
        }
    };
}

choices!(TipoDocumento {
    Cc => ("CC", "Cédula de Ciudadanía"),
    Ce => ("CE", "Cédula de Extranjería"),
    Ti => ("TI", "Tarjeta de Identidad"),
    Pas => ("PAS", "Pasaporte"),
    Pep => ("PEP", "Permiso Especial de Permanencia"),
});

impl TipoDocumento {
    /// Document kinds whose number is purely numeric.
    pub fn is_numeric(self) -> bool {
        matches!(self, TipoDocumento::Cc | TipoDocumento::Ce | TipoDocumento::Ti)
    }
}

choices!(NivelEducativo {
    Tecnico => ("TEC", "Técnico"),
    Tecnologo => ("TECNOL", "Tecnólogo"),
    Profesional => ("PROF", "Profesional"),
    Especializacion => ("ESP", "Especialización"),
    Maestria => ("MAE", "Maestría"),
    Doctorado => ("DOC", "Doctorado"),
});

choices!(NivelFormacion {
    Auxiliar => ("AUX", "Auxiliar"),
    Operario => ("OPE", "Operario"),
    Tecnico => ("TEC", "Técnico"),
    Tecnologo => ("TECNOL", "Tecnólogo"),
    Especializacion => ("ESP", "Especialización Tecnológica"),
});

choices!(Modalidad {
    Presencial => ("PRES", "Presencial"),
    Virtual => ("VIRT", "Virtual"),
    Mixta => ("MIX", "Mixta"),
});

choices!(EstadoPrograma {
    Activo => ("ACT", "Activo"),
    Inactivo => ("INA", "Inactivo"),
    Suspendido => ("SUS", "Suspendido"),
});

choices!(EstadoCurso {
    Programado => ("PRO", "Programado"),
    EnEjecucion => ("EJE", "En Ejecución"),
    Finalizado => ("FIN", "Finalizado"),
    Cancelado => ("CAN", "Cancelado"),
});

choices!(EstadoInscripcion {
    Inscrito => ("INS", "Inscrito"),
    Cursando => ("CUR", "Cursando"),
    Aprobado => ("APR", "Aprobado"),
    Reprobado => ("REP", "Reprobado"),
    Retirado => ("RET", "Retirado"),
});

#[derive(sqlx::FromRow, Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct AprendizData {
    pub document: String,
    pub firstname: String,
    pub lastname: String,
    pub phone: Option<String>,
    pub email: String,
    pub birthdate: Option<NaiveDate>,
    pub city: Option<String>,
    pub program: Option<String>,
}

#[derive(sqlx::FromRow, Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Aprendiz {
    pub id: i64,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub data: AprendizData,
}

#[derive(sqlx::FromRow, Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct InstructorData {
    #[sqlx(try_from = "String")]
    pub tipo_documento: TipoDocumento,
    pub documento_id: String,
    pub nombre: String,
    pub apellido: String,
    pub telefono: Option<String>,
    pub correo: String,
    pub fecha_nacimiento: NaiveDate,
    pub ciudad: Option<String>,
    pub direccion: Option<String>,
    #[sqlx(try_from = "String")]
    pub nivel_educativo: NivelEducativo,
    pub especialidad: Option<String>,
    pub anos_experiencia: i32,
    pub activo: bool,
    pub fecha_vinculacion: NaiveDate,
}

#[derive(sqlx::FromRow, Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Instructor {
    pub id: i64,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub data: InstructorData,
}

#[derive(sqlx::FromRow, Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ProgramaData {
    pub codigo: String,
    pub nombre: String,
    #[sqlx(try_from = "String")]
    pub nivel_formacion: NivelFormacion,
    #[sqlx(try_from = "String")]
    pub modalidad: Modalidad,
    pub duracion_meses: i32,
    pub duracion_horas: i32,
    pub descripcion: Option<String>,
    pub competencias: Option<String>,
    pub perfil_egreso: Option<String>,
    pub requisitos_ingreso: Option<String>,
    pub centro_formacion: Option<String>,
    pub regional: Option<String>,
    #[sqlx(try_from = "String")]
    pub estado: EstadoPrograma,
    pub fecha_creacion: Option<NaiveDate>,
}

#[derive(sqlx::FromRow, Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Programa {
    pub id: i64,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub data: ProgramaData,
}

#[derive(sqlx::FromRow, Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CursoData {
    pub codigo: String,
    pub nombre: String,
    pub programa_id: i64,
    pub instructor_coordinador_id: i64,
    pub fecha_inicio: NaiveDate,
    pub fecha_fin: NaiveDate,
    pub horario: Option<String>,
    pub aula: Option<String>,
    pub cupos_maximos: i32,
    #[sqlx(try_from = "String")]
    pub estado: EstadoCurso,
    pub observaciones: Option<String>,
}

#[derive(sqlx::FromRow, Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Curso {
    pub id: i64,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub data: CursoData,
}

impl Curso {
    /// Remaining seats given the current number of enrollments.
    pub fn cupos_disponibles(&self, inscritos: i64) -> i64 {
        i64::from(self.data.cupos_maximos) - inscritos
    }
}

#[derive(sqlx::FromRow, Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct InstructorCursoData {
    pub instructor_id: i64,
    pub curso_id: i64,
    pub rol: Option<String>,
}

#[derive(sqlx::FromRow, Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct InstructorCurso {
    pub id: i64,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub data: InstructorCursoData,
}

#[derive(sqlx::FromRow, Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct AprendizCursoData {
    pub aprendiz_id: i64,
    pub curso_id: i64,
    #[sqlx(try_from = "String")]
    pub estado: EstadoInscripcion,
    pub nota_final: Option<f64>,
    pub observaciones: Option<String>,
}

#[derive(sqlx::FromRow, Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct AprendizCurso {
    pub id: i64,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub data: AprendizCursoData,
}

/// Record counts shown on the home page.
#[derive(Serialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Totales {
    pub instructores: i64,
    pub aprendices: i64,
    pub programas: i64,
    pub cursos: i64,
}

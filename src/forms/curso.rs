use std::collections::HashMap;

use super::{
    choice, codigo, date, integer, optional_decimal, optional_text, related, text, Cleaner, FormData,
    FormErrors, Validated,
};
use crate::models::{
    Aprendiz, AprendizCurso, AprendizCursoData, Curso, CursoData, EstadoCurso, EstadoInscripcion,
    Instructor, InstructorCursoData, Programa,
};

/// Two years.
pub const MAX_DURACION_DIAS: i64 = 730;
pub const MIN_CUPOS: i32 = 5;
pub const MAX_CUPOS: i32 = 100;

/// Selection lists offered by the course form: active programs by name and
/// active instructors by last name then first name.
#[derive(Debug, Clone, Default)]
pub struct CursoChoices {
    pub programas: Vec<Programa>,
    pub instructores: Vec<Instructor>,
}

#[derive(Debug, Clone, Default)]
pub struct AsignacionChoices {
    pub instructores: Vec<Instructor>,
    pub cursos: Vec<Curso>,
}

#[derive(Debug, Clone, Default)]
pub struct InscripcionChoices {
    pub aprendices: Vec<Aprendiz>,
    pub cursos: Vec<Curso>,
    /// Enrollment count per course id.
    pub inscritos: HashMap<i64, i64>,
}

impl InscripcionChoices {
    pub fn cupos_disponibles(&self, curso: &Curso) -> i64 {
        curso.cupos_disponibles(self.inscritos.get(&curso.id).copied().unwrap_or(0))
    }
}

pub struct CursoForm;

impl CursoForm {
    pub fn validate(
        data: &FormData,
        choices: &CursoChoices,
    ) -> Result<Validated<CursoData>, FormErrors> {
        let mut c = Cleaner::new(data);

        let codigo = c.field("codigo", codigo);
        let nombre = c.field("nombre", text);
        let programa = c.field("programa", |raw| related(raw, &choices.programas, |p| p.id));
        let coordinador = c.field("instructor_coordinador", |raw| {
            related(raw, &choices.instructores, |i| i.id)
        });
        let fecha_inicio = c.field("fecha_inicio", date);
        let fecha_fin = c.field("fecha_fin", date);
        let horario = c.field("horario", optional_text);
        let aula = c.field("aula", optional_text);
        let cupos_maximos = c.field("cupos_maximos", clean_cupos_maximos);
        let estado = c.field("estado", choice::<EstadoCurso>);
        let observaciones = c.field("observaciones", optional_text);

        if let (Some(inicio), Some(fin)) = (fecha_inicio, fecha_fin) {
            if fin <= inicio {
                c.reject("La fecha de finalización debe ser posterior a la fecha de inicio.");
            } else if (fin - inicio).num_days() > MAX_DURACION_DIAS {
                c.advise(
                    "fecha_fin",
                    "La duración del curso parece demasiado larga. Verifique las fechas.",
                );
            }
        }

        let value = (|| {
            Some(CursoData {
                codigo: codigo?,
                nombre: nombre?,
                programa_id: programa?.id,
                instructor_coordinador_id: coordinador?.id,
                fecha_inicio: fecha_inicio?,
                fecha_fin: fecha_fin?,
                horario: horario?,
                aula: aula?,
                cupos_maximos: cupos_maximos?,
                estado: estado?,
                observaciones: observaciones?,
            })
        })();
        c.finish(value)
    }
}

fn clean_cupos_maximos(raw: &str) -> Result<i32, String> {
    let cupos = integer(raw)?;
    if cupos < MIN_CUPOS {
        return Err("Los cupos mínimos deben ser al menos 5.".into());
    }
    if cupos > MAX_CUPOS {
        return Err("Los cupos máximos no pueden exceder 100.".into());
    }
    Ok(cupos)
}

pub struct InstructorCursoForm;

impl InstructorCursoForm {
    pub fn validate(
        data: &FormData,
        choices: &AsignacionChoices,
    ) -> Result<Validated<InstructorCursoData>, FormErrors> {
        let mut c = Cleaner::new(data);

        let instructor = c.field("instructor", |raw| related(raw, &choices.instructores, |i| i.id));
        let curso = c.field("curso", |raw| related(raw, &choices.cursos, |k| k.id));
        let rol = c.field("rol", optional_text);

        let value = (|| {
            Some(InstructorCursoData {
                instructor_id: instructor?.id,
                curso_id: curso?.id,
                rol: rol?,
            })
        })();
        c.finish(value)
    }
}

pub struct AprendizCursoForm;

impl AprendizCursoForm {
    /// `existing` is the enrollment being edited; capacity is only checked
    /// for new enrollments.
    pub fn validate(
        data: &FormData,
        choices: &InscripcionChoices,
        existing: Option<&AprendizCurso>,
    ) -> Result<Validated<AprendizCursoData>, FormErrors> {
        let mut c = Cleaner::new(data);

        let aprendiz = c.field("aprendiz", |raw| related(raw, &choices.aprendices, |a| a.id));
        let curso = c.field("curso", |raw| related(raw, &choices.cursos, |k| k.id));
        let estado = c.field("estado", choice::<EstadoInscripcion>);
        let nota_final = c.field("nota_final", clean_nota_final);
        let observaciones = c.field("observaciones", optional_text);

        if let (Some(curso), Some(_), None) = (curso, aprendiz, existing) {
            if choices.cupos_disponibles(curso) <= 0 {
                c.reject(format!(
                    "El curso {} no tiene cupos disponibles.",
                    curso.data.codigo
                ));
            }
        }

        let value = (|| {
            Some(AprendizCursoData {
                aprendiz_id: aprendiz?.id,
                curso_id: curso?.id,
                estado: estado?,
                nota_final: nota_final?,
                observaciones: observaciones?,
            })
        })();
        c.finish(value)
    }
}

fn clean_nota_final(raw: &str) -> Result<Option<f64>, String> {
    let nota = optional_decimal(raw)?;
    if let Some(n) = nota {
        if !(0.0..=5.0).contains(&n) {
            return Err("La nota debe estar entre 0.0 y 5.0".into());
        }
    }
    Ok(nota)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forms::{form, AdvisoryPolicy, INVALID_CHOICE};
    use crate::models::{
        AprendizData, EstadoPrograma, InstructorData, Modalidad, NivelEducativo, NivelFormacion,
        ProgramaData, TipoDocumento,
    };
    use chrono::NaiveDate;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn programa(id: i64) -> Programa {
        Programa {
            id,
            data: ProgramaData {
                codigo: format!("P-{id}"),
                nombre: "Cocina".into(),
                nivel_formacion: NivelFormacion::Tecnico,
                modalidad: Modalidad::Presencial,
                duracion_meses: 12,
                duracion_horas: 1920,
                descripcion: None,
                competencias: None,
                perfil_egreso: None,
                requisitos_ingreso: None,
                centro_formacion: None,
                regional: None,
                estado: EstadoPrograma::Activo,
                fecha_creacion: None,
            },
        }
    }

    fn instructor(id: i64) -> Instructor {
        Instructor {
            id,
            data: InstructorData {
                tipo_documento: TipoDocumento::Cc,
                documento_id: "123".into(),
                nombre: "Ana".into(),
                apellido: "Ruiz".into(),
                telefono: None,
                correo: "ana@sena.edu.co".into(),
                fecha_nacimiento: day(1980, 1, 1),
                ciudad: None,
                direccion: None,
                nivel_educativo: NivelEducativo::Profesional,
                especialidad: None,
                anos_experiencia: 10,
                activo: true,
                fecha_vinculacion: day(2010, 1, 1),
            },
        }
    }

    fn curso(id: i64, cupos_maximos: i32) -> Curso {
        Curso {
            id,
            data: CursoData {
                codigo: format!("C-{id}"),
                nombre: "Cocina 1".into(),
                programa_id: 1,
                instructor_coordinador_id: 1,
                fecha_inicio: day(2025, 2, 1),
                fecha_fin: day(2025, 12, 1),
                horario: None,
                aula: None,
                cupos_maximos,
                estado: EstadoCurso::Programado,
                observaciones: None,
            },
        }
    }

    fn aprendiz(id: i64) -> Aprendiz {
        Aprendiz {
            id,
            data: AprendizData {
                document: "1000".into(),
                firstname: "Luis".into(),
                lastname: "Mora".into(),
                phone: None,
                email: "luis@example.com".into(),
                birthdate: None,
                city: None,
                program: None,
            },
        }
    }

    fn curso_choices() -> CursoChoices {
        CursoChoices {
            programas: vec![programa(1)],
            instructores: vec![instructor(1)],
        }
    }

    fn curso_form(overrides: &[(&'static str, &'static str)]) -> FormData {
        let mut pairs = vec![
            ("codigo", " cur-2025-001"),
            ("nombre", "Cocina básica"),
            ("programa", "1"),
            ("instructor_coordinador", "1"),
            ("fecha_inicio", "2025-02-01"),
            ("fecha_fin", "2025-12-01"),
            ("cupos_maximos", "30"),
            ("estado", "PRO"),
        ];
        for (k, v) in overrides {
            pairs.retain(|(name, _)| name != k);
            pairs.push((k, v));
        }
        form(&pairs)
    }

    fn blocking(data: &FormData) -> Result<Validated<CursoData>, FormErrors> {
        CursoForm::validate(data, &curso_choices()).and_then(|v| AdvisoryPolicy::Block.enforce(v))
    }

    #[test]
    fn accepts_and_normalizes_a_course() {
        let v = blocking(&curso_form(&[])).unwrap().value;
        assert_eq!(v.codigo, "CUR-2025-001");
        assert_eq!(v.programa_id, 1);
        assert_eq!(v.instructor_coordinador_id, 1);
    }

    #[test]
    fn capacity_bounds() {
        assert!(blocking(&curso_form(&[("cupos_maximos", "4")])).unwrap_err().has_field("cupos_maximos"));
        assert!(blocking(&curso_form(&[("cupos_maximos", "5")])).is_ok());
        assert!(blocking(&curso_form(&[("cupos_maximos", "100")])).is_ok());
        assert!(blocking(&curso_form(&[("cupos_maximos", "101")])).unwrap_err().has_field("cupos_maximos"));
    }

    #[test]
    fn end_date_must_follow_start_date() {
        let same = blocking(&curso_form(&[("fecha_fin", "2025-02-01")])).unwrap_err();
        assert_eq!(
            same.non_field(),
            ["La fecha de finalización debe ser posterior a la fecha de inicio.".to_string()]
        );
        assert!(blocking(&curso_form(&[("fecha_fin", "2025-01-15")])).is_err());
        assert!(blocking(&curso_form(&[("fecha_fin", "2025-02-02")])).is_ok());
    }

    #[test]
    fn long_courses_get_a_fecha_fin_advisory() {
        // 2025-02-01 + 730 days = 2027-02-01
        assert!(blocking(&curso_form(&[("fecha_fin", "2027-02-01")])).is_ok());
        let errs = blocking(&curso_form(&[("fecha_fin", "2027-02-02")])).unwrap_err();
        assert!(errs.has_field("fecha_fin"));
        assert!(errs.non_field().is_empty());
    }

    #[test]
    fn markup_in_codigo_rejected_anywhere() {
        for bad in ["\"CUR", "cur'1", "CUR>", "c<ur"] {
            let errs = blocking(&curso_form(&[("codigo", bad)])).unwrap_err();
            assert!(errs.has_field("codigo"), "{bad}");
        }
    }

    #[test]
    fn programa_outside_active_list_is_invalid() {
        let errs = blocking(&curso_form(&[("programa", "9")])).unwrap_err();
        assert_eq!(errs.field("programa"), vec![INVALID_CHOICE]);
        let errs = blocking(&curso_form(&[("instructor_coordinador", "x")])).unwrap_err();
        assert_eq!(errs.field("instructor_coordinador"), vec![INVALID_CHOICE]);
    }

    #[test]
    fn assignment_requires_active_instructor() {
        let choices = AsignacionChoices {
            instructores: vec![instructor(1)],
            cursos: vec![curso(3, 20)],
        };
        let ok = InstructorCursoForm::validate(
            &form(&[("instructor", "1"), ("curso", "3"), ("rol", "Técnico")]),
            &choices,
        )
        .unwrap();
        assert_eq!(ok.value.rol.as_deref(), Some("Técnico"));

        let errs = InstructorCursoForm::validate(&form(&[("instructor", "2"), ("curso", "3")]), &choices)
            .unwrap_err();
        assert!(errs.has_field("instructor"));
    }

    fn inscripcion_choices(inscritos: i64) -> InscripcionChoices {
        InscripcionChoices {
            aprendices: vec![aprendiz(7)],
            cursos: vec![curso(3, 5)],
            inscritos: HashMap::from([(3, inscritos)]),
        }
    }

    fn inscripcion(nota: &'static str) -> FormData {
        form(&[("aprendiz", "7"), ("curso", "3"), ("estado", "INS"), ("nota_final", nota)])
    }

    #[test]
    fn full_course_rejects_new_enrollment() {
        let errs = AprendizCursoForm::validate(&inscripcion(""), &inscripcion_choices(5), None)
            .unwrap_err();
        assert_eq!(errs.non_field(), ["El curso C-3 no tiene cupos disponibles.".to_string()]);

        let ok = AprendizCursoForm::validate(&inscripcion(""), &inscripcion_choices(4), None);
        assert!(ok.is_ok());
    }

    #[test]
    fn editing_an_enrollment_skips_capacity() {
        let existing = AprendizCurso {
            id: 1,
            data: AprendizCursoData {
                aprendiz_id: 7,
                curso_id: 3,
                estado: EstadoInscripcion::Inscrito,
                nota_final: None,
                observaciones: None,
            },
        };
        let ok = AprendizCursoForm::validate(&inscripcion("4.2"), &inscripcion_choices(5), Some(&existing))
            .unwrap();
        assert_eq!(ok.value.nota_final, Some(4.2));
    }

    #[test]
    fn nota_final_range() {
        let choices = inscripcion_choices(0);
        assert!(AprendizCursoForm::validate(&inscripcion("5.0"), &choices, None).is_ok());
        assert!(AprendizCursoForm::validate(&inscripcion("0"), &choices, None).is_ok());
        for bad in ["5.1", "-0.1"] {
            let errs = AprendizCursoForm::validate(&inscripcion(bad), &choices, None).unwrap_err();
            assert_eq!(errs.field("nota_final"), vec!["La nota debe estar entre 0.0 y 5.0"]);
        }
        let errs = AprendizCursoForm::validate(&inscripcion("abc"), &choices, None).unwrap_err();
        assert!(errs.has_field("nota_final"));
    }
}

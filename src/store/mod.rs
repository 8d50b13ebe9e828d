//! Persistence collaborators for the CRUD controller.

use async_trait::async_trait;
use std::collections::HashMap;

use crate::error::AppError;
use crate::models::{
    Aprendiz, AprendizCurso, Curso, Instructor, InstructorCurso, Programa, Totales,
};
use crate::resource::Resource;

pub mod memory;
pub mod pg;

pub use memory::MemoryBackend;
pub use pg::PgBackend;

/// Row-level storage for one record type.
#[async_trait]
pub trait Repository<R: Resource>: Send + Sync {
    /// All rows ordered by id.
    async fn list(&self) -> Result<Vec<R>, AppError>;
    async fn get(&self, id: i64) -> Result<Option<R>, AppError>;
    async fn insert(&self, data: &R::Data) -> Result<R, AppError>;
    /// `Ok(None)` when no row has `id`.
    async fn update(&self, id: i64, data: &R::Data) -> Result<Option<R>, AppError>;
    /// `Ok(false)` when no row has `id`.
    async fn delete(&self, id: i64) -> Result<bool, AppError>;
}

/// Everything the controller needs: one repository per record type plus the
/// cross-entity lookups used by forms and detail pages.
#[async_trait]
pub trait Backend:
    Repository<Aprendiz>
    + Repository<Instructor>
    + Repository<Programa>
    + Repository<Curso>
    + Repository<InstructorCurso>
    + Repository<AprendizCurso>
    + Clone
    + Send
    + Sync
    + 'static
{
    /// Programs with estado ACT ordered by nombre.
    async fn programas_activos(&self) -> Result<Vec<Programa>, AppError>;
    /// Instructors with activo set, ordered by apellido then nombre.
    async fn instructores_activos(&self) -> Result<Vec<Instructor>, AppError>;
    async fn inscripciones_de_curso(&self, curso_id: i64) -> Result<Vec<AprendizCurso>, AppError>;
    async fn asignaciones_de_curso(&self, curso_id: i64)
        -> Result<Vec<InstructorCurso>, AppError>;
    /// Enrollment count keyed by course id; courses without enrollments are
    /// absent.
    async fn inscritos_por_curso(&self) -> Result<HashMap<i64, i64>, AppError>;
    async fn totales(&self) -> Result<Totales, AppError>;
}

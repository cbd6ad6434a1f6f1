use registrar_core::{StudentId, StudentResponse};

use super::AppContext;
use crate::error::Result;

pub async fn register(ctx: &AppContext, id: i64) -> Result<StudentResponse> {
    Ok(ctx.students.register(id).await?)
}

pub async fn show(ctx: &AppContext, id: i64) -> Result<StudentResponse> {
    let id = StudentId::new(id).map_err(registrar_core::Error::from)?;
    Ok(ctx.students.find(id).await?)
}

use registrar_core::{CreateOfferingRequest, OfferingId, OfferingResponse};
use serde::Serialize;

use super::AppContext;
use crate::error::Result;

#[derive(Debug, Clone, Serialize)]
pub struct DeletedOffering {
    pub id: i64,
    pub deleted: bool,
}

pub async fn create(ctx: &AppContext, request: &CreateOfferingRequest) -> Result<OfferingResponse> {
    Ok(ctx.offerings.create(request).await?)
}

pub async fn list(ctx: &AppContext) -> Result<Vec<OfferingResponse>> {
    Ok(ctx.offerings.list().await?)
}

pub async fn show(ctx: &AppContext, id: i64) -> Result<OfferingResponse> {
    let id = OfferingId::new(id).map_err(registrar_core::Error::from)?;
    Ok(ctx.offerings.find(id).await?)
}

pub async fn delete(ctx: &AppContext, id: i64) -> Result<DeletedOffering> {
    let id = OfferingId::new(id).map_err(registrar_core::Error::from)?;
    ctx.offerings.delete(id).await?;
    Ok(DeletedOffering {
        id: id.get(),
        deleted: true,
    })
}

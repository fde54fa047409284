//! `/user` handlers: the binding protocol itself.

use axum::Json;
use axum::extract::{Path, State};
use bindery_proto::{BindingStatus, OwnerBody};

use super::AppState;
use crate::error::{AccessError, AccessResult};
use crate::guard::{RequestContext, Tier, admit};

/// `GET /user`
pub async fn status(State(state): State<AppState>) -> AccessResult<Json<BindingStatus>> {
    Ok(Json(state.bindings().status().await?))
}

/// `POST /user/:action`
///
/// The action name is checked before identity, so `POST /user/dance`
/// is `InvalidAction` even without a `USER-ID` header.
pub async fn action(
    State(state): State<AppState>,
    Path(action): Path<String>,
    ctx: RequestContext,
) -> AccessResult<Json<OwnerBody>> {
    let bindings = state.bindings();
    let owner = match action.as_str() {
        "bind" => {
            let caller = admit(Tier::Identified, &ctx, bindings).await?;
            bindings.bind(caller.ok_or(AccessError::Unauthenticated)?).await?
        }
        "unbind" => {
            let caller = admit(Tier::Owner, &ctx, bindings).await?;
            bindings.unbind(caller.ok_or(AccessError::Unauthenticated)?).await?
        }
        _ => return Err(AccessError::InvalidAction(action)),
    };
    Ok(Json(OwnerBody::from(&owner)))
}

use crate::helpers::ApiError;
use actix_web::HttpRequest;

/// Reads a numeric id from a named path segment, e.g. `{conversation}`.
/// Non-numeric input is a bad request; a number no row can carry is simply not found.
pub fn id_from_path(req: &HttpRequest, name: &str) -> Result<i32, ApiError> {
    let raw = req
        .match_info()
        .get(name)
        .ok_or_else(|| ApiError::BadRequest(format!("{} path param not found", name)))?;

    let id = raw
        .parse::<i64>()
        .map_err(|err| ApiError::BadRequest(format!("invalid {} id {:?}: {}", name, raw, err)))?;

    i32::try_from(id).map_err(|_| ApiError::NotFound(format!("{} {} not found", name, id)))
}

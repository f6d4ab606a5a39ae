use super::errors::{BusinessError, StorageFailure};
use super::session::Session;
use super::state::AppState;
use crate::operators::models as operators;
use crate::stations::models as stations;
use axum::extract::FromRequestParts;
use axum::http::{header::AUTHORIZATION, request::Parts};
use sea_orm::{ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter};

/// The authenticated identity behind an inbound operation.
#[derive(Clone, Debug, PartialEq)]
pub enum Principal {
    Station(stations::Model),
    Operator(operators::Model),
    Unauthenticated,
}

impl Principal {
    pub fn as_operator(&self) -> Option<&operators::Model> {
        match self {
            Principal::Operator(operator) => Some(operator),
            Principal::Station(_) | Principal::Unauthenticated => None,
        }
    }

    pub fn as_station(&self) -> Option<&stations::Model> {
        match self {
            Principal::Station(station) => Some(station),
            Principal::Operator(_) | Principal::Unauthenticated => None,
        }
    }
}

/// Pluggable comparison of presented secrets against persisted ones.
///
/// `seal` produces the value stored for a new password or API key. Stations
/// are looked up by their sealed key, so `seal` must be deterministic for
/// API keys (a keyed digest works, a randomly salted hash does not). `verify`
/// decides whether a presented secret matches a stored value.
pub trait CredentialVerifier: Send + Sync {
    fn seal(&self, secret: &str) -> String;
    fn verify(&self, presented: &str, stored: &str) -> bool;
}

/// Stores secrets as given and compares them byte for byte.
#[derive(Clone, Copy, Debug, Default)]
pub struct PlaintextVerifier;

impl CredentialVerifier for PlaintextVerifier {
    fn seal(&self, secret: &str) -> String {
        secret.to_string()
    }

    fn verify(&self, presented: &str, stored: &str) -> bool {
        presented.as_bytes() == stored.as_bytes()
    }
}

/// Extract the token of an `Authorization: Bearer <token>` header value.
///
/// The value is split once on the first space; anything but the exact scheme
/// word `Bearer` followed by a non-empty token is rejected.
pub fn parse_bearer(header: &str) -> Option<&str> {
    let (scheme, token) = header.split_once(' ')?;
    if scheme != "Bearer" || token.is_empty() {
        return None;
    }
    Some(token)
}

/// Map an `Authorization` header value to a principal.
///
/// The token is tried as a station API key first, then as an operator
/// username. No match is a normal outcome and yields `Unauthenticated`.
pub async fn resolve_principal(
    db: &DatabaseConnection,
    verifier: &dyn CredentialVerifier,
    header: Option<&str>,
) -> Result<Principal, StorageFailure> {
    let Some(token) = header.and_then(parse_bearer) else {
        return Ok(Principal::Unauthenticated);
    };

    let session = Session::open(db, "resolve_principal").await?;
    let principal = lookup_principal(session.conn(), verifier, token).await;
    session.close(principal).await
}

async fn lookup_principal<C: ConnectionTrait>(
    conn: &C,
    verifier: &dyn CredentialVerifier,
    token: &str,
) -> Result<Principal, DbErr> {
    let station = stations::Entity::find()
        .filter(stations::Column::ApiKey.eq(verifier.seal(token)))
        .one(conn)
        .await?;
    if let Some(station) = station.filter(|s| verifier.verify(token, &s.api_key)) {
        return Ok(Principal::Station(station));
    }

    let operator = operators::Entity::find()
        .filter(operators::Column::Username.eq(token))
        .one(conn)
        .await?;

    Ok(operator.map_or(Principal::Unauthenticated, Principal::Operator))
}

/// Principal of the current request, resolved from its `Authorization` header.
pub struct Caller(pub Principal);

impl FromRequestParts<AppState> for Caller {
    type Rejection = BusinessError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok());

        let principal = resolve_principal(&state.db, state.verifier.as_ref(), header).await?;
        Ok(Caller(principal))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Bearer key1", Some("key1"))]
    #[case("Bearer key with spaces", Some("key with spaces"))]
    #[case("Bearer ", None)]
    #[case("Bearer", None)]
    #[case("bearer key1", None)]
    #[case("Basic key1", None)]
    #[case("key1", None)]
    #[case("", None)]
    fn test_parse_bearer(#[case] header: &str, #[case] expected: Option<&str>) {
        assert_eq!(parse_bearer(header), expected);
    }

    #[test]
    fn test_plaintext_verifier() {
        let verifier = PlaintextVerifier;
        assert_eq!(verifier.seal("secret"), "secret");
        assert!(verifier.verify("secret", "secret"));
        assert!(!verifier.verify("secret", "Secret"));
        assert!(!verifier.verify("", "secret"));
    }

    #[test]
    fn test_principal_accessors() {
        let operator = operators::Model {
            id: 1,
            username: "alice".to_string(),
            password: "pw".to_string(),
        };
        let principal = Principal::Operator(operator.clone());
        assert_eq!(principal.as_operator(), Some(&operator));
        assert!(principal.as_station().is_none());
        assert!(Principal::Unauthenticated.as_operator().is_none());
        assert!(Principal::Unauthenticated.as_station().is_none());
    }
}

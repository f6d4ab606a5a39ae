use super::models::{AccessToken, ActiveModel, Column, Entity, Model, Operator};
use crate::common::auth::CredentialVerifier;
use crate::common::errors::StorageFailure;
use crate::common::session::Session;
use crate::readings::models as readings;
use crate::stations::models as stations;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr,
    EntityTrait, QueryFilter, QuerySelect,
};

#[derive(Clone, Debug, PartialEq)]
pub enum LoginOutcome {
    Granted(AccessToken),
    InvalidCredentials,
}

#[derive(Clone, Debug, PartialEq)]
pub enum RegisterOperatorOutcome {
    Registered(Operator),
    AlreadyExists,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RemoveOperatorOutcome {
    Removed,
    NotFound,
}

/// Exchange a username and password for a bearer credential.
///
/// Unknown usernames and wrong passwords are indistinguishable to the caller.
pub async fn login(
    db: &DatabaseConnection,
    verifier: &dyn CredentialVerifier,
    username: &str,
    password: &str,
) -> Result<LoginOutcome, StorageFailure> {
    let session = Session::open(db, "login").await?;
    let operator = find_by_username(session.conn(), username).await;
    let operator = session.close(operator).await?;

    match operator {
        Some(operator) if verifier.verify(password, &operator.password) => {
            tracing::info!(username, "operator logged in");
            Ok(LoginOutcome::Granted(AccessToken::bearer(&operator.username)))
        }
        _ => {
            tracing::warn!(username, "rejected login");
            Ok(LoginOutcome::InvalidCredentials)
        }
    }
}

/// Store a new operator. Username uniqueness is enforced by the unique index
/// on `operators.username`.
pub async fn register_operator(
    db: &DatabaseConnection,
    verifier: &dyn CredentialVerifier,
    username: &str,
    password: &str,
) -> Result<RegisterOperatorOutcome, StorageFailure> {
    let session = Session::open(db, "register_operator").await?;
    let outcome = insert_operator(session.conn(), username, verifier.seal(password)).await;

    match session.close(outcome).await {
        Ok(outcome) => Ok(outcome),
        Err(failure) if failure.is_unique_violation() => {
            tracing::warn!(username, "username already taken");
            Ok(RegisterOperatorOutcome::AlreadyExists)
        }
        Err(failure) => Err(failure),
    }
}

/// Delete an operator together with every station it owns and their readings.
pub async fn remove_operator(
    db: &DatabaseConnection,
    operator_id: i32,
) -> Result<RemoveOperatorOutcome, StorageFailure> {
    let session = Session::open(db, "remove_operator").await?;
    let outcome = delete_operator_cascade(session.conn(), operator_id).await;
    session.close(outcome).await
}

async fn find_by_username<C: ConnectionTrait>(conn: &C, username: &str) -> Result<Option<Model>, DbErr> {
    Entity::find()
        .filter(Column::Username.eq(username))
        .one(conn)
        .await
}

async fn insert_operator<C: ConnectionTrait>(
    conn: &C,
    username: &str,
    sealed_password: String,
) -> Result<RegisterOperatorOutcome, DbErr> {
    let operator = ActiveModel {
        username: Set(username.to_string()),
        password: Set(sealed_password),
        ..Default::default()
    }
    .insert(conn)
    .await?;

    tracing::info!(operator_id = operator.id, username, "operator registered");
    Ok(RegisterOperatorOutcome::Registered(operator.into()))
}

async fn delete_operator_cascade<C: ConnectionTrait>(
    conn: &C,
    operator_id: i32,
) -> Result<RemoveOperatorOutcome, DbErr> {
    if Entity::find_by_id(operator_id).one(conn).await?.is_none() {
        return Ok(RemoveOperatorOutcome::NotFound);
    }

    let station_ids: Vec<i32> = stations::Entity::find()
        .select_only()
        .column(stations::Column::StationId)
        .filter(stations::Column::OwnerId.eq(operator_id))
        .into_tuple()
        .all(conn)
        .await?;

    if !station_ids.is_empty() {
        readings::Entity::delete_many()
            .filter(readings::Column::StationId.is_in(station_ids.clone()))
            .exec(conn)
            .await?;
        stations::Entity::delete_many()
            .filter(stations::Column::StationId.is_in(station_ids.clone()))
            .exec(conn)
            .await?;
    }

    Entity::delete_by_id(operator_id).exec(conn).await?;

    tracing::info!(
        operator_id,
        stations_removed = station_ids.len(),
        "operator removed"
    );
    Ok(RemoveOperatorOutcome::Removed)
}

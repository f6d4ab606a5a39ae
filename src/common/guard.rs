//! Authorization decisions for mutations.
//!
//! Reads are public and never pass through here.

use super::auth::Principal;
use crate::operators::models as operators;
use crate::stations::models as stations;

/// A mutation together with the record it targets, when one exists yet.
#[derive(Clone, Copy, Debug)]
pub enum Operation<'a> {
    CreateStation,
    UpdateStation(&'a stations::Model),
    DeleteStation(&'a stations::Model),
    IngestReading,
}

/// Identity a permitted mutation acts as.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Grant<'a> {
    /// The operator creating or owning the station
    Operator(&'a operators::Model),
    /// The station whose reading is being stored; readings never name another station
    Station(&'a stations::Model),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Denial {
    /// Missing credential, or a credential of the wrong kind for this operation
    Unauthenticated,
    /// Authenticated operator that does not own the target
    Forbidden,
}

pub fn authorize<'a>(principal: &'a Principal, operation: Operation<'_>) -> Result<Grant<'a>, Denial> {
    match (principal, operation) {
        (Principal::Operator(operator), Operation::CreateStation) => Ok(Grant::Operator(operator)),
        (
            Principal::Operator(operator),
            Operation::UpdateStation(station) | Operation::DeleteStation(station),
        ) => {
            if station.owner_id == operator.id {
                Ok(Grant::Operator(operator))
            } else {
                Err(Denial::Forbidden)
            }
        }
        (Principal::Station(station), Operation::IngestReading) => Ok(Grant::Station(station)),
        (Principal::Operator(_), Operation::IngestReading)
        | (
            Principal::Station(_),
            Operation::CreateStation | Operation::UpdateStation(_) | Operation::DeleteStation(_),
        )
        | (Principal::Unauthenticated, _) => Err(Denial::Unauthenticated),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn operator(id: i32) -> operators::Model {
        operators::Model {
            id,
            username: format!("operator-{id}"),
            password: "pw".to_string(),
        }
    }

    fn station(station_id: i32, owner_id: i32) -> stations::Model {
        stations::Model {
            station_id,
            longitude: 10.0,
            latitude: 20.0,
            api_key: format!("key-{station_id}"),
            owner_id,
        }
    }

    #[test]
    fn test_operator_may_create_station() {
        let alice = operator(1);
        let principal = Principal::Operator(alice.clone());
        assert_eq!(
            authorize(&principal, Operation::CreateStation),
            Ok(Grant::Operator(&alice))
        );
    }

    #[test]
    fn test_owner_may_update_and_delete() {
        let principal = Principal::Operator(operator(1));
        let owned = station(5, 1);
        assert!(authorize(&principal, Operation::UpdateStation(&owned)).is_ok());
        assert!(authorize(&principal, Operation::DeleteStation(&owned)).is_ok());
    }

    #[test]
    fn test_foreign_station_is_forbidden() {
        let principal = Principal::Operator(operator(2));
        let foreign = station(5, 1);
        assert_eq!(
            authorize(&principal, Operation::UpdateStation(&foreign)),
            Err(Denial::Forbidden)
        );
        assert_eq!(
            authorize(&principal, Operation::DeleteStation(&foreign)),
            Err(Denial::Forbidden)
        );
    }

    #[test]
    fn test_station_ingests_as_itself() {
        let own = station(5, 1);
        let principal = Principal::Station(own.clone());
        assert_eq!(
            authorize(&principal, Operation::IngestReading),
            Ok(Grant::Station(&own))
        );
    }

    #[test]
    fn test_wrong_principal_kind_is_unauthenticated() {
        let target = station(5, 1);
        let as_station = Principal::Station(target.clone());
        assert_eq!(
            authorize(&as_station, Operation::CreateStation),
            Err(Denial::Unauthenticated)
        );
        assert_eq!(
            authorize(&as_station, Operation::DeleteStation(&target)),
            Err(Denial::Unauthenticated)
        );

        let as_operator = Principal::Operator(operator(1));
        assert_eq!(
            authorize(&as_operator, Operation::IngestReading),
            Err(Denial::Unauthenticated)
        );

        for operation in [
            Operation::CreateStation,
            Operation::UpdateStation(&target),
            Operation::DeleteStation(&target),
            Operation::IngestReading,
        ] {
            assert_eq!(
                authorize(&Principal::Unauthenticated, operation),
                Err(Denial::Unauthenticated)
            );
        }
    }
}

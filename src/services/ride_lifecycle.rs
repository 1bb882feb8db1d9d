//! Ciclo de vida de un viaje
//!
//! Un viaje nace abierto (sin llegada) y se cierra una sola vez; nunca
//! vuelve a abrirse. Estas funciones son puras: deciden sobre la foto del
//! historial del conductor y devuelven la escritura a aplicar, o el error
//! tipado que la impide. El orquestador las llama dentro del ámbito
//! exclusivo del conductor y aplica el resultado de una sola vez.

use crate::models::{
    DriverSnapshot, NewRide, NewStop, Ride, RideCompletion, RideId, RideReplacement, Stop,
    StopId, StopInput, TrafficCondition,
};
use crate::utils::errors::{invalid_state_error, not_found_error, AppError, AppResult};
use crate::utils::validation::validate_stop_input;

use super::driver_ledger::DriverLedger;
use super::location_catalog::LocationCatalog;
use super::stop_ordering::is_after;

/// Datos de llegada para cerrar un viaje
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Arrival {
    pub stop: StopInput,
    pub traffic_condition: TrafficCondition,
    pub comment: Option<String>,
}

/// Reemplazo completo de un viaje a partir de paradas existentes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RideUpdate {
    pub departure_id: StopId,
    pub arrival_id: Option<StopId>,
    pub traffic_condition: TrafficCondition,
    pub comment: Option<String>,
}

pub fn find_ride(snapshot: &DriverSnapshot, id: RideId) -> AppResult<&Ride> {
    DriverLedger::new(&snapshot.rides)
        .ride(id)
        .ok_or_else(|| not_found_error("Ride", id))
}

pub fn find_stop(snapshot: &DriverSnapshot, id: StopId) -> AppResult<&Stop> {
    snapshot
        .stops
        .iter()
        .find(|stop| stop.id == id)
        .ok_or_else(|| not_found_error("Stop", id))
}

/// Prepara una parada nueva: datos válidos, ubicación propia y sin duplicar
pub fn plan_stop(snapshot: &DriverSnapshot, input: StopInput) -> AppResult<NewStop> {
    validate_stop_input(&input)?;
    LocationCatalog::find_for(snapshot, input.location_id)?;
    let stop = NewStop {
        driver_id: snapshot.driver.identifier.clone(),
        input,
    };
    if snapshot.stops.iter().any(|existing| stop.duplicates(existing)) {
        return Err(AppError::Conflict(format!(
            "A stop at {} with odometer {} already exists for this location",
            stop.input.moment, stop.input.odometer_value
        )));
    }
    Ok(stop)
}

/// Una parada sólo se borra si ningún viaje la usa
pub fn plan_stop_deletion(snapshot: &DriverSnapshot, id: StopId) -> AppResult<StopId> {
    let stop = find_stop(snapshot, id)?;
    if let Some(ride) = DriverLedger::new(&snapshot.rides).ride_using_stop(stop.id, None) {
        return Err(AppError::Conflict(format!(
            "Stop {} is used by ride {}",
            stop.id, ride.id
        )));
    }
    Ok(stop.id)
}

/// Abrir un viaje: el conductor debe poder salir con la parada dada
pub fn plan_start(snapshot: &DriverSnapshot, departure: StopInput) -> AppResult<NewRide> {
    validate_stop_input(&departure)?;
    LocationCatalog::find_for(snapshot, departure.location_id)?;

    let ledger = DriverLedger::new(&snapshot.rides);
    if !ledger.can_start_with(Some(&departure)) {
        let reason = if ledger.is_driving() {
            "the driver is already driving"
        } else {
            "the departure is not after the last arrival"
        };
        return Err(invalid_state_error("start a ride", reason));
    }

    Ok(NewRide {
        driver_id: snapshot.driver.identifier.clone(),
        departure: plan_stop(snapshot, departure)?,
    })
}

/// Cerrar un viaje abierto con una llegada posterior a su salida
pub fn plan_completion(
    snapshot: &DriverSnapshot,
    ride_id: RideId,
    arrival: Arrival,
) -> AppResult<RideCompletion> {
    validate_stop_input(&arrival.stop)?;
    let ride = find_ride(snapshot, ride_id)?;
    if ride.is_done() {
        return Err(invalid_state_error("complete the ride", "the ride is already done"));
    }
    LocationCatalog::find_for(snapshot, arrival.stop.location_id)?;
    if !is_after(&arrival.stop, Some(&ride.departure)) {
        return Err(invalid_state_error(
            "complete the ride",
            "the arrival must take place after the departure",
        ));
    }

    Ok(RideCompletion {
        ride_id: ride.id,
        arrival: plan_stop(snapshot, arrival.stop)?,
        traffic_condition: arrival.traffic_condition,
        comment: arrival.comment,
    })
}

/// Reemplazar salida, llegada, condición y comentario de un viaje.
/// El historial resultante debe seguir siendo coherente.
pub fn plan_replacement(
    snapshot: &DriverSnapshot,
    ride_id: RideId,
    update: RideUpdate,
) -> AppResult<RideReplacement> {
    let ride = find_ride(snapshot, ride_id)?;
    let departure = find_stop(snapshot, update.departure_id)?;
    let arrival = update
        .arrival_id
        .map(|id| find_stop(snapshot, id))
        .transpose()?;

    if arrival.is_some_and(|arrival| arrival.id == departure.id) {
        return Err(invalid_state_error(
            "update the ride",
            "the departure and the arrival must be different stops",
        ));
    }
    if ride.is_done() && arrival.is_none() {
        return Err(invalid_state_error(
            "update the ride",
            "a completed ride cannot be reopened",
        ));
    }

    let ledger = DriverLedger::new(&snapshot.rides);
    for stop in std::iter::once(departure).chain(arrival) {
        if let Some(other) = ledger.ride_using_stop(stop.id, Some(ride.id)) {
            return Err(AppError::Conflict(format!(
                "Stop {} is already used by ride {}",
                stop.id, other.id
            )));
        }
    }

    let replaced = Ride {
        id: ride.id,
        driver_id: ride.driver_id.clone(),
        departure: departure.clone(),
        arrival: arrival.cloned(),
        traffic_condition: update.traffic_condition,
        comment: update.comment.clone(),
    };
    let history: Vec<Ride> = snapshot
        .rides
        .iter()
        .map(|existing| {
            if existing.id == ride.id {
                replaced.clone()
            } else {
                existing.clone()
            }
        })
        .collect();
    DriverLedger::new(&history)
        .validate_history()
        .map_err(|violation| invalid_state_error("update the ride", &violation.to_string()))?;

    Ok(RideReplacement {
        ride_id: ride.id,
        driver_id: snapshot.driver.identifier.clone(),
        departure_id: departure.id,
        arrival_id: arrival.map(|arrival| arrival.id),
        traffic_condition: update.traffic_condition,
        comment: update.comment,
    })
}

/// Un viaje propio se puede borrar siempre, esté abierto o cerrado.
/// Sus paradas se van con él.
pub fn plan_deletion(snapshot: &DriverSnapshot, ride_id: RideId) -> AppResult<RideId> {
    find_ride(snapshot, ride_id).map(|ride| ride.id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Driver, Location};
    use chrono::NaiveDateTime;

    fn moment(text: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M").unwrap()
    }

    fn input(at: &str, odometer_value: i64) -> StopInput {
        StopInput {
            moment: moment(at),
            location_id: 1,
            odometer_value,
        }
    }

    fn stop(id: StopId, at: &str, odometer_value: i64) -> Stop {
        Stop {
            id,
            driver_id: "alice".to_string(),
            location_id: 1,
            moment: moment(at),
            odometer_value,
        }
    }

    fn ride(id: RideId, departure: &Stop, arrival: Option<&Stop>) -> Ride {
        Ride {
            id,
            driver_id: "alice".to_string(),
            departure: departure.clone(),
            arrival: arrival.cloned(),
            traffic_condition: TrafficCondition::Normal,
            comment: None,
        }
    }

    fn snapshot(stops: Vec<Stop>, rides: Vec<Ride>) -> DriverSnapshot {
        DriverSnapshot {
            driver: Driver::new("alice", 100),
            rides,
            stops,
            locations: vec![Location {
                id: 1,
                driver_id: "alice".to_string(),
                name: "Home".to_string(),
                latitude: 48.85,
                longitude: 2.35,
            }],
        }
    }

    fn update(departure_id: StopId, arrival_id: Option<StopId>) -> RideUpdate {
        RideUpdate {
            departure_id,
            arrival_id,
            traffic_condition: TrafficCondition::Slow,
            comment: Some("roadworks".to_string()),
        }
    }

    #[test]
    fn test_start_requires_owned_location() {
        let snapshot = snapshot(vec![], vec![]);
        let departure = StopInput {
            location_id: 99,
            ..input("2020-01-01 08:00", 1000)
        };
        assert!(matches!(
            plan_start(&snapshot, departure),
            Err(AppError::NotFound(_))
        ));
    }

    #[test]
    fn test_start_rejects_negative_odometer() {
        let snapshot = snapshot(vec![], vec![]);
        assert!(matches!(
            plan_start(&snapshot, input("2020-01-01 08:00", -5)),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_start_while_driving_is_invalid_state() {
        let departure = stop(1, "2020-01-01 08:00", 1000);
        let snapshot = snapshot(vec![departure.clone()], vec![ride(1, &departure, None)]);
        assert!(matches!(
            plan_start(&snapshot, input("2020-01-01 08:10", 1010)),
            Err(AppError::InvalidState(_))
        ));
    }

    #[test]
    fn test_start_with_duplicate_stop_is_conflict() {
        let departure = stop(1, "2020-01-01 08:00", 1000);
        let arrival = stop(2, "2020-01-01 08:30", 1020);
        let loose = stop(3, "2020-01-01 09:00", 1020);
        let snapshot = snapshot(
            vec![departure.clone(), arrival.clone(), loose],
            vec![ride(1, &departure, Some(&arrival))],
        );
        assert!(matches!(
            plan_start(&snapshot, input("2020-01-01 09:00", 1020)),
            Err(AppError::Conflict(_))
        ));
    }

    #[test]
    fn test_completion_requires_open_ride_and_later_arrival() {
        let departure = stop(1, "2020-01-01 08:00", 1000);
        let snapshot = snapshot(vec![departure.clone()], vec![ride(1, &departure, None)]);
        let arrival = |at: &str| Arrival {
            stop: input(at, 1020),
            traffic_condition: TrafficCondition::Calm,
            comment: None,
        };

        assert!(matches!(
            plan_completion(&snapshot, 1, arrival("2020-01-01 07:30")),
            Err(AppError::InvalidState(_))
        ));
        assert!(matches!(
            plan_completion(&snapshot, 2, arrival("2020-01-01 08:30")),
            Err(AppError::NotFound(_))
        ));
        let completion = plan_completion(&snapshot, 1, arrival("2020-01-01 08:30")).unwrap();
        assert_eq!(completion.ride_id, 1);
        assert_eq!(completion.traffic_condition, TrafficCondition::Calm);
    }

    #[test]
    fn test_completed_ride_cannot_be_completed_again() {
        let departure = stop(1, "2020-01-01 08:00", 1000);
        let arrival = stop(2, "2020-01-01 08:30", 1020);
        let snapshot = snapshot(
            vec![departure.clone(), arrival.clone()],
            vec![ride(1, &departure, Some(&arrival))],
        );
        let again = Arrival {
            stop: input("2020-01-01 09:30", 1030),
            traffic_condition: TrafficCondition::Normal,
            comment: None,
        };
        assert!(matches!(
            plan_completion(&snapshot, 1, again),
            Err(AppError::InvalidState(_))
        ));
    }

    #[test]
    fn test_replacement_rejects_same_stop_twice() {
        let departure = stop(1, "2020-01-01 08:00", 1000);
        let snapshot = snapshot(vec![departure.clone()], vec![ride(1, &departure, None)]);
        assert!(matches!(
            plan_replacement(&snapshot, 1, update(1, Some(1))),
            Err(AppError::InvalidState(_))
        ));
    }

    #[test]
    fn test_replacement_rejects_unknown_stop() {
        let departure = stop(1, "2020-01-01 08:00", 1000);
        let snapshot = snapshot(vec![departure.clone()], vec![ride(1, &departure, None)]);
        assert!(matches!(
            plan_replacement(&snapshot, 1, update(1, Some(42))),
            Err(AppError::NotFound(_))
        ));
    }

    #[test]
    fn test_replacement_closes_ride_with_existing_stop() {
        let departure = stop(1, "2020-01-01 08:00", 1000);
        let arrival = stop(2, "2020-01-01 08:30", 1020);
        let snapshot = snapshot(
            vec![departure.clone(), arrival],
            vec![ride(1, &departure, None)],
        );
        let replacement = plan_replacement(&snapshot, 1, update(1, Some(2))).unwrap();
        assert_eq!(replacement.arrival_id, Some(2));
        assert_eq!(replacement.traffic_condition, TrafficCondition::Slow);
    }

    #[test]
    fn test_replacement_cannot_reopen_or_overlap() {
        let first_departure = stop(1, "2020-01-01 08:00", 1000);
        let first_arrival = stop(2, "2020-01-01 08:30", 1020);
        let second_departure = stop(3, "2020-01-01 09:00", 1020);
        let second_arrival = stop(4, "2020-01-01 10:00", 1050);
        let late_arrival = stop(5, "2020-01-01 09:15", 1030);
        let snapshot = snapshot(
            vec![
                first_departure.clone(),
                first_arrival.clone(),
                second_departure.clone(),
                second_arrival.clone(),
                late_arrival,
            ],
            vec![
                ride(1, &first_departure, Some(&first_arrival)),
                ride(2, &second_departure, Some(&second_arrival)),
            ],
        );

        assert!(matches!(
            plan_replacement(&snapshot, 1, update(1, None)),
            Err(AppError::InvalidState(_))
        ));
        // La llegada a las 9:15 solapa con la salida de las 9:00
        assert!(matches!(
            plan_replacement(&snapshot, 1, update(1, Some(5))),
            Err(AppError::InvalidState(_))
        ));
        // La parada 3 ya es la salida del viaje 2
        assert!(matches!(
            plan_replacement(&snapshot, 1, update(1, Some(3))),
            Err(AppError::Conflict(_))
        ));
    }

    #[test]
    fn test_stop_in_use_cannot_be_deleted() {
        let departure = stop(1, "2020-01-01 08:00", 1000);
        let loose = stop(2, "2020-01-01 12:00", 1100);
        let snapshot = snapshot(vec![departure.clone(), loose], vec![ride(1, &departure, None)]);
        assert!(matches!(
            plan_stop_deletion(&snapshot, 1),
            Err(AppError::Conflict(_))
        ));
        assert_eq!(plan_stop_deletion(&snapshot, 2).unwrap(), 2);
        assert!(matches!(
            plan_stop_deletion(&snapshot, 3),
            Err(AppError::NotFound(_))
        ));
    }

    #[test]
    fn test_deleting_unknown_ride_is_not_found() {
        let snapshot = snapshot(vec![], vec![]);
        assert!(matches!(plan_deletion(&snapshot, 1), Err(AppError::NotFound(_))));
    }
}

//! Libro de viajes de un conductor
//!
//! Consultas puras sobre el historial inmutable de viajes de un conductor:
//! si ya ha conducido, cuál es su último viaje, si está conduciendo y si
//! puede empezar un viaje nuevo con una parada dada.

use thiserror::Error;

use crate::models::{Ride, RideId, StopId};

use super::stop_ordering::{is_after, Timed};

/// Violación de las reglas de sucesión del historial
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HistoryViolation {
    #[error("ride {ride} uses the same stop for departure and arrival")]
    SameStop { ride: RideId },

    #[error("ride {ride} does not arrive after it departs")]
    ArrivalNotAfterDeparture { ride: RideId },

    #[error("ride {ride} is still open but is not the last ride")]
    OpenRideNotLast { ride: RideId },

    #[error("ride {ride} departs before ride {previous} has arrived")]
    Overlap { previous: RideId, ride: RideId },
}

/// Vista de sólo lectura sobre los viajes de un conductor
#[derive(Debug, Clone, Copy)]
pub struct DriverLedger<'a> {
    rides: &'a [Ride],
}

impl<'a> DriverLedger<'a> {
    pub fn new(rides: &'a [Ride]) -> Self {
        Self { rides }
    }

    pub fn has_driven(&self) -> bool {
        !self.rides.is_empty()
    }

    /// Viaje con el momento de salida más reciente. A igualdad de momento
    /// gana el id más alto.
    pub fn last_ride(&self) -> Option<&'a Ride> {
        self.rides
            .iter()
            .max_by_key(|ride| (ride.departure_moment(), ride.id))
    }

    pub fn is_driving(&self) -> bool {
        self.last_ride().is_some_and(|ride| !ride.is_done())
    }

    /// Decide si el conductor puede salir con `candidate`:
    /// sin parada nunca; sin historial siempre; si no, cuando no está
    /// conduciendo y la parada es posterior a la última llegada.
    pub fn can_start_with<S: Timed + ?Sized>(&self, candidate: Option<&S>) -> bool {
        let Some(candidate) = candidate else {
            return false;
        };
        if !self.has_driven() {
            return true;
        }
        let last_arrival = self.last_ride().and_then(|ride| ride.arrival.as_ref());
        !self.is_driving() && is_after(candidate, last_arrival)
    }

    pub fn ride(&self, id: RideId) -> Option<&'a Ride> {
        self.rides.iter().find(|ride| ride.id == id)
    }

    /// Viaje, distinto de `excluding`, que usa la parada como salida o llegada
    pub fn ride_using_stop(&self, stop_id: StopId, excluding: Option<RideId>) -> Option<&'a Ride> {
        self.rides
            .iter()
            .find(|ride| Some(ride.id) != excluding && ride.uses_stop(stop_id))
    }

    /// Viajes ordenados por salida (mismo desempate que `last_ride`)
    pub fn chronological(&self) -> Vec<&'a Ride> {
        let mut rides: Vec<&Ride> = self.rides.iter().collect();
        rides.sort_by_key(|ride| (ride.departure_moment(), ride.id));
        rides
    }

    /// Comprueba que el historial completo respeta la sucesión cronológica:
    /// cada viaje llega después de salir, sólo el último puede estar
    /// abierto y cada salida es posterior a la llegada anterior.
    pub fn validate_history(&self) -> Result<(), HistoryViolation> {
        let rides = self.chronological();
        for ride in &rides {
            if let Some(arrival) = &ride.arrival {
                if arrival.id == ride.departure.id {
                    return Err(HistoryViolation::SameStop { ride: ride.id });
                }
                if !is_after(arrival, Some(&ride.departure)) {
                    return Err(HistoryViolation::ArrivalNotAfterDeparture { ride: ride.id });
                }
            }
        }
        for pair in rides.windows(2) {
            let (previous, ride) = (pair[0], pair[1]);
            match &previous.arrival {
                None => return Err(HistoryViolation::OpenRideNotLast { ride: previous.id }),
                Some(arrival) if !is_after(&ride.departure, Some(arrival)) => {
                    return Err(HistoryViolation::Overlap {
                        previous: previous.id,
                        ride: ride.id,
                    })
                }
                Some(_) => {}
            }
        }
        Ok(())
    }

    /// Distancia total de los viajes cerrados, saturada en `i64::MAX`
    pub fn total_distance(&self) -> i64 {
        self.rides
            .iter()
            .filter_map(Ride::distance)
            .fold(0, i64::saturating_add)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Stop, StopInput, TrafficCondition};
    use chrono::{NaiveDate, NaiveDateTime};

    fn moment(text: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M").unwrap()
    }

    fn stop(id: StopId, at: &str, odometer_value: i64) -> Stop {
        Stop {
            id,
            driver_id: "pseudonym".to_string(),
            location_id: 1,
            moment: moment(at),
            odometer_value,
        }
    }

    fn ride(id: RideId, departure: Stop, arrival: Option<Stop>) -> Ride {
        Ride {
            id,
            driver_id: "pseudonym".to_string(),
            departure,
            arrival,
            traffic_condition: TrafficCondition::Normal,
            comment: None,
        }
    }

    fn candidate(at: &str) -> StopInput {
        StopInput {
            moment: moment(at),
            location_id: 1,
            odometer_value: 10100,
        }
    }

    #[test]
    fn test_driver_can_start_without_past_rides() {
        let ledger = DriverLedger::new(&[]);
        assert!(!ledger.has_driven());
        assert!(ledger.can_start_with(Some(&candidate("2020-01-01 13:30"))));
    }

    #[test]
    fn test_driver_cannot_start_with_no_stop() {
        let ledger = DriverLedger::new(&[]);
        assert!(!ledger.can_start_with::<StopInput>(None));
    }

    #[test]
    fn test_driver_can_start_with_stop_after_last_arrival() {
        let rides = vec![ride(
            1,
            stop(1, "2020-01-01 13:30", 10000),
            Some(stop(2, "2020-01-01 14:30", 10050)),
        )];
        let ledger = DriverLedger::new(&rides);
        assert!(ledger.can_start_with(Some(&candidate("2020-01-01 14:45"))));
    }

    #[test]
    fn test_driver_cannot_start_with_stop_before_last_arrival() {
        let rides = vec![ride(
            1,
            stop(1, "2020-01-01 13:30", 10000),
            Some(stop(2, "2020-01-01 14:30", 10100)),
        )];
        let ledger = DriverLedger::new(&rides);
        assert!(!ledger.can_start_with(Some(&candidate("2020-01-01 14:00"))));
        assert!(!ledger.can_start_with(Some(&candidate("2020-01-01 14:30"))));
    }

    #[test]
    fn test_driver_cannot_start_when_driving() {
        let rides = vec![ride(1, stop(1, "2020-01-01 13:30", 10000), None)];
        let ledger = DriverLedger::new(&rides);
        assert!(ledger.is_driving());
        assert!(!ledger.can_start_with(Some(&candidate("2020-01-01 13:00"))));
        assert!(!ledger.can_start_with(Some(&candidate("2030-01-01 13:00"))));
    }

    #[test]
    fn test_last_ride_ties_go_to_highest_id() {
        let rides = vec![
            ride(7, stop(1, "2020-01-01 13:30", 10000), None),
            ride(3, stop(2, "2020-01-01 13:30", 10000), None),
        ];
        let ledger = DriverLedger::new(&rides);
        assert_eq!(ledger.last_ride().map(|r| r.id), Some(7));
    }

    #[test]
    fn test_last_ride_is_latest_departure() {
        let rides = vec![
            ride(
                2,
                stop(3, "2020-01-02 08:00", 10200),
                Some(stop(4, "2020-01-02 09:00", 10250)),
            ),
            ride(
                5,
                stop(1, "2020-01-01 08:00", 10000),
                Some(stop(2, "2020-01-01 09:00", 10100)),
            ),
        ];
        let ledger = DriverLedger::new(&rides);
        assert_eq!(ledger.last_ride().map(|r| r.id), Some(2));
        assert!(!ledger.is_driving());
        assert_eq!(ledger.total_distance(), 150);
    }

    #[test]
    fn test_total_distance_saturates() {
        let rides = vec![
            ride(
                1,
                stop(1, "2020-01-01 08:00", 0),
                Some(stop(2, "2020-01-01 09:00", i64::MAX)),
            ),
            ride(
                2,
                stop(3, "2020-01-02 08:00", 0),
                Some(stop(4, "2020-01-02 09:00", i64::MAX)),
            ),
        ];
        let ledger = DriverLedger::new(&rides);
        assert_eq!(ledger.total_distance(), i64::MAX);
    }

    #[test]
    fn test_validate_history_accepts_succession() {
        let rides = vec![
            ride(
                1,
                stop(1, "2020-01-01 08:00", 10000),
                Some(stop(2, "2020-01-01 09:00", 10100)),
            ),
            ride(2, stop(3, "2020-01-01 09:30", 10100), None),
        ];
        assert_eq!(DriverLedger::new(&rides).validate_history(), Ok(()));
    }

    #[test]
    fn test_validate_history_rejects_overlap() {
        let rides = vec![
            ride(
                1,
                stop(1, "2020-01-01 08:00", 10000),
                Some(stop(2, "2020-01-01 09:00", 10100)),
            ),
            ride(
                2,
                stop(3, "2020-01-01 08:30", 10100),
                Some(stop(4, "2020-01-01 10:00", 10200)),
            ),
        ];
        assert_eq!(
            DriverLedger::new(&rides).validate_history(),
            Err(HistoryViolation::Overlap { previous: 1, ride: 2 })
        );
    }

    #[test]
    fn test_validate_history_rejects_open_ride_in_the_middle() {
        let rides = vec![
            ride(1, stop(1, "2020-01-01 08:00", 10000), None),
            ride(
                2,
                stop(3, "2020-01-01 10:00", 10100),
                Some(stop(4, "2020-01-01 11:00", 10200)),
            ),
        ];
        assert_eq!(
            DriverLedger::new(&rides).validate_history(),
            Err(HistoryViolation::OpenRideNotLast { ride: 1 })
        );
    }

    #[test]
    fn test_validate_history_rejects_backwards_ride() {
        let rides = vec![ride(
            1,
            stop(1, "2020-01-01 08:00", 10000),
            Some(stop(2, "2020-01-01 07:00", 10100)),
        )];
        assert_eq!(
            DriverLedger::new(&rides).validate_history(),
            Err(HistoryViolation::ArrivalNotAfterDeparture { ride: 1 })
        );
    }
}

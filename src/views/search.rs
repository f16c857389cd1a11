//! Búsqueda en listas: substring sin distinguir mayúsculas.
//! Nunca modifica el store, sólo devuelve referencias filtradas.

use std::borrow::Cow;

use crate::models::{Driver, DriverType, SafetyCategory, ScoreCardItem, Snapshot, Truck};

pub trait Searchable {
    /// Campos visibles sobre los que se busca
    fn search_fields(&self) -> Vec<Cow<'_, str>>;
}

impl Searchable for Driver {
    fn search_fields(&self) -> Vec<Cow<'_, str>> {
        vec![
            Cow::Owned(self.full_name()),
            Cow::Borrowed(self.driver_code.as_str()),
        ]
    }
}

impl Searchable for DriverType {
    fn search_fields(&self) -> Vec<Cow<'_, str>> {
        vec![Cow::Borrowed(self.driver_type.as_str())]
    }
}

impl Searchable for SafetyCategory {
    fn search_fields(&self) -> Vec<Cow<'_, str>> {
        vec![
            Cow::Borrowed(self.code.as_str()),
            Cow::Borrowed(self.description.as_str()),
        ]
    }
}

impl Searchable for ScoreCardItem {
    fn search_fields(&self) -> Vec<Cow<'_, str>> {
        vec![
            Cow::Borrowed(self.sc_description.as_str()),
            Cow::Borrowed(self.sc_category.as_str()),
        ]
    }
}

/// `true` si algún campo contiene la consulta. Una consulta vacía coincide con todo.
pub fn matches<S: AsRef<str>>(query: &str, fields: &[S]) -> bool {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }
    fields
        .iter()
        .any(|field| field.as_ref().to_lowercase().contains(&needle))
}

pub fn filter<'a, T: Searchable>(items: &'a [T], query: &str) -> Vec<&'a T> {
    items
        .iter()
        .filter(|item| matches(query, &item.search_fields()))
        .collect()
}

/// Roster de drivers, opcionalmente limitado a un driver type
pub fn filter_drivers<'a>(
    drivers: &'a [Driver],
    query: &str,
    driver_type_id: Option<i32>,
) -> Vec<&'a Driver> {
    filter(drivers, query)
        .into_iter()
        .filter(|d| driver_type_id.map_or(true, |id| d.driver_type_id == Some(id)))
        .collect()
}

/// Trucks por unit number o por el nombre del driver asignado
pub fn filter_trucks<'a>(snapshot: &'a Snapshot, query: &str) -> Vec<&'a Truck> {
    snapshot
        .trucks
        .iter()
        .filter(|truck| {
            let mut fields = vec![truck.unit_number.clone()];
            if let Some(driver) = snapshot.driver_for_truck(truck.truck_id) {
                fields.push(driver.full_name());
            }
            matches(query, &fields)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TruckStatus;

    fn driver(id: i32, first: &str, last: &str, code: &str) -> Driver {
        Driver {
            driver_id: id,
            driver_code: code.to_string(),
            first_name: first.to_string(),
            last_name: last.to_string(),
            start_date: None,
            truck_id: None,
            driver_type_id: Some(if id % 2 == 0 { 2 } else { 1 }),
            profile_pic: None,
        }
    }

    #[test]
    fn test_driver_search_is_case_insensitive() {
        let drivers = vec![
            driver(1, "John", "Smith", "JS01"),
            driver(2, "Al", "Smithson", "AS02"),
            driver(3, "Mary", "Jones", "MJ03"),
        ];
        let found: Vec<i32> = filter(&drivers, "SMI").iter().map(|d| d.driver_id).collect();
        assert_eq!(found, vec![1, 2]);

        let by_code: Vec<i32> = filter(&drivers, "mj0").iter().map(|d| d.driver_id).collect();
        assert_eq!(by_code, vec![3]);
        assert_eq!(filter(&drivers, "").len(), 3);
        assert_eq!(filter_drivers(&drivers, "smi", Some(2)).len(), 1);
    }

    #[test]
    fn test_truck_search_includes_driver_name() {
        let mut holder = driver(1, "John", "Smith", "JS01");
        holder.truck_id = Some(10);
        let snapshot = Snapshot {
            drivers: vec![holder],
            trucks: vec![
                Truck {
                    truck_id: 10,
                    unit_number: "T-100".to_string(),
                    year: 2022,
                    status: TruckStatus::Assigned,
                },
                Truck {
                    truck_id: 11,
                    unit_number: "T-200".to_string(),
                    year: 2020,
                    status: TruckStatus::Available,
                },
            ],
            ..Default::default()
        };

        let by_driver: Vec<i32> = filter_trucks(&snapshot, "smith")
            .iter()
            .map(|t| t.truck_id)
            .collect();
        assert_eq!(by_driver, vec![10]);
        assert_eq!(filter_trucks(&snapshot, "t-2").len(), 1);
    }
}

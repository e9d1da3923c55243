use crate::models::{CompanyRecord, DirectoryAction, DirectoryState, Facets, SortDirection};
use std::collections::HashSet;

/// Pure reducer over the directory view state. Re-selecting the active sort
/// field toggles direction; selecting a new field resets it to ascending.
/// Any filter or sort change resets the page to 1 so a shrunken result set
/// can never strand the user on a page past the end.
pub fn reduce(state: DirectoryState, action: DirectoryAction) -> DirectoryState {
    match action {
        DirectoryAction::SearchChanged(search_text) => DirectoryState {
            search_text,
            current_page: 1,
            ..state
        },
        DirectoryAction::IndustrySelected(industry_filter) => DirectoryState {
            industry_filter,
            current_page: 1,
            ..state
        },
        DirectoryAction::CitySelected(city_filter) => DirectoryState {
            city_filter,
            current_page: 1,
            ..state
        },
        DirectoryAction::SortSelected(field) => {
            let sort_direction = if field == state.sort_field {
                state.sort_direction.toggled()
            } else {
                SortDirection::Asc
            };
            DirectoryState {
                sort_field: field,
                sort_direction,
                current_page: 1,
                ..state
            }
        }
        DirectoryAction::PageRequested(page) => DirectoryState {
            current_page: page.max(1),
            ..state
        },
    }
}

/// Distinct non-empty industries and cities, in first-seen order, for the
/// filter dropdowns.
pub fn facets(companies: &[CompanyRecord]) -> Facets {
    let mut industries = Vec::new();
    let mut cities = Vec::new();
    let mut seen_industries = HashSet::new();
    let mut seen_cities = HashSet::new();

    for company in companies {
        if !company.industry.is_empty() && seen_industries.insert(company.industry.clone()) {
            industries.push(company.industry.clone());
        }
        let city = &company.headquarters.city;
        if !city.is_empty() && seen_cities.insert(city.clone()) {
            cities.push(city.clone());
        }
    }

    Facets { industries, cities }
}

#[cfg(test)]
mod tests {
    use super::{facets, reduce};
    use crate::models::{
        CompanyRecord, DirectoryAction, DirectoryState, Headquarters, SortDirection, SortField,
    };

    #[test]
    fn reselecting_the_active_field_toggles_direction() {
        let state = DirectoryState::default();
        assert_eq!(state.sort_field, SortField::Name);
        assert_eq!(state.sort_direction, SortDirection::Asc);

        let state = reduce(state, DirectoryAction::SortSelected(SortField::Name));
        assert_eq!(state.sort_field, SortField::Name);
        assert_eq!(state.sort_direction, SortDirection::Desc);

        let state = reduce(state, DirectoryAction::SortSelected(SortField::Employees));
        assert_eq!(state.sort_field, SortField::Employees);
        assert_eq!(state.sort_direction, SortDirection::Asc);
    }

    #[test]
    fn filter_changes_reset_the_page() {
        let state = DirectoryState {
            current_page: 4,
            ..DirectoryState::default()
        };
        let state = reduce(
            state,
            DirectoryAction::IndustrySelected(Some("Tech".to_string())),
        );
        assert_eq!(state.current_page, 1);

        let state = reduce(
            DirectoryState {
                current_page: 3,
                ..state
            },
            DirectoryAction::SearchChanged("acme".to_string()),
        );
        assert_eq!(state.current_page, 1);

        let state = reduce(
            DirectoryState {
                current_page: 2,
                ..state
            },
            DirectoryAction::SortSelected(SortField::Rank),
        );
        assert_eq!(state.current_page, 1);
    }

    #[test]
    fn page_requests_do_not_touch_filters() {
        let state = DirectoryState {
            search_text: "bank".to_string(),
            ..DirectoryState::default()
        };
        let state = reduce(state, DirectoryAction::PageRequested(3));
        assert_eq!(state.current_page, 3);
        assert_eq!(state.search_text, "bank");
    }

    #[test]
    fn facets_are_distinct_and_skip_empties() {
        let make = |industry: &str, city: &str| CompanyRecord {
            id: "x".to_string(),
            rank: 0,
            name: "X".to_string(),
            industry: industry.to_string(),
            description: String::new(),
            headquarters: Headquarters {
                city: city.to_string(),
                country: "Russia".to_string(),
            },
            employees: 0,
            market_cap_or_revenue: 0.0,
            website: None,
            contact_email: None,
            phone: None,
            logo_url: None,
            featured: false,
            ceo: None,
            rtib_contact: None,
        };

        let list = vec![
            make("Tech", "Moscow"),
            make("Retail", "Moscow"),
            make("Tech", ""),
            make("", "Kazan"),
        ];
        let facets = facets(&list);
        assert_eq!(facets.industries, vec!["Tech", "Retail"]);
        assert_eq!(facets.cities, vec!["Moscow", "Kazan"]);
    }
}

use crate::models::{CompanyRecord, DirectoryPage, DirectoryState, SortDirection, SortField};
use std::cmp::Ordering;

/// Reduces the full in-memory list to the records matching the current
/// criteria. Search text matches case-insensitively as a substring of name,
/// industry, or description (any one of them); categorical filters are
/// exact-match and AND-combined. Relative order is preserved.
pub fn filter_companies(companies: &[CompanyRecord], state: &DirectoryState) -> Vec<CompanyRecord> {
    let query = state.search_text.trim().to_lowercase();

    companies
        .iter()
        .filter(|company| {
            if !query.is_empty() {
                let matches_text = company.name.to_lowercase().contains(&query)
                    || company.industry.to_lowercase().contains(&query)
                    || company.description.to_lowercase().contains(&query);
                if !matches_text {
                    return false;
                }
            }

            if let Some(industry) = state.industry_filter.as_ref() {
                if &company.industry != industry {
                    return false;
                }
            }

            if let Some(city) = state.city_filter.as_ref() {
                if &company.headquarters.city != city {
                    return false;
                }
            }

            true
        })
        .cloned()
        .collect()
}

fn compare_text(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}

fn compare_companies(a: &CompanyRecord, b: &CompanyRecord, field: SortField) -> Ordering {
    match field {
        SortField::Rank => a.rank.cmp(&b.rank),
        SortField::Name => compare_text(&a.name, &b.name),
        SortField::Industry => compare_text(&a.industry, &b.industry),
        SortField::MarketCap => a
            .market_cap_or_revenue
            .partial_cmp(&b.market_cap_or_revenue)
            .unwrap_or(Ordering::Equal),
        SortField::Employees => a.employees.cmp(&b.employees),
        SortField::Headquarters => compare_text(&a.headquarters.city, &b.headquarters.city),
        SortField::Ceo => compare_text(
            a.ceo.as_ref().map(|ceo| ceo.name.as_str()).unwrap_or(""),
            b.ceo.as_ref().map(|ceo| ceo.name.as_str()).unwrap_or(""),
        ),
    }
}

/// Total order over the filtered list. `Desc` is the reversed `Asc`
/// comparator, not a separate one, so the two directions are mirror images
/// for any input; equal keys keep their filter-stage relative order because
/// the underlying sort is stable. Text fields compare case-insensitively by
/// code point, not by locale collation (see DESIGN.md).
pub fn sort_companies(companies: &mut [CompanyRecord], field: SortField, direction: SortDirection) {
    companies.sort_by(|a, b| {
        let ordering = compare_companies(a, b, field);
        match direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    });
}

pub fn total_pages(filtered_count: usize, page_size: u32) -> u32 {
    if page_size == 0 {
        return 0;
    }
    filtered_count.div_ceil(page_size as usize) as u32
}

/// Contiguous 1-indexed slice of a (filtered, sorted) list. Pages past the
/// end are not clamped; they come back empty, which is why state changes
/// upstream must reset the page.
pub fn paginate(companies: &[CompanyRecord], page_size: u32, page: u32) -> Vec<CompanyRecord> {
    if page == 0 || page_size == 0 {
        return Vec::new();
    }
    let start = (page as usize - 1) * page_size as usize;
    companies
        .iter()
        .skip(start)
        .take(page_size as usize)
        .cloned()
        .collect()
}

/// The whole pipeline as a pure function of the raw snapshot and the view
/// state: filter, then sort, then slice the requested page.
pub fn visible_slice(
    companies: &[CompanyRecord],
    state: &DirectoryState,
    page_size: u32,
) -> DirectoryPage {
    let mut filtered = filter_companies(companies, state);
    sort_companies(&mut filtered, state.sort_field, state.sort_direction);

    let total = filtered.len();
    DirectoryPage {
        items: paginate(&filtered, page_size, state.current_page),
        total,
        total_pages: total_pages(total, page_size),
        page: state.current_page,
    }
}

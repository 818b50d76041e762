//! Built-in categories and amenities.

/// Name and description of a catalog entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedEntry {
    pub name: &'static str,
    pub description: &'static str,
}

const fn entry(name: &'static str, description: &'static str) -> SeedEntry {
    SeedEntry { name, description }
}

pub const CATEGORIES: &[SeedEntry] = &[
    entry("cabin", "Cozy wooden cabins in natural settings, perfect for a rustic getaway"),
    entry("airstream", "Classic Airstream trailers offering a unique and retro camping experience"),
    entry("tent", "Traditional camping tents for an authentic outdoor adventure"),
    entry("warehouse", "Converted industrial spaces offering unique, spacious accommodations"),
    entry("cottage", "Charming small houses offering comfort and traditional countryside appeal"),
    entry("container", "Modern converted shipping containers with innovative designs"),
    entry("caravan", "Mobile homes and caravans for a flexible traveling experience"),
    entry("lodge", "Spacious mountain or forest lodges ideal for group getaways"),
    entry("farmhouse", "Traditional farm accommodations offering an authentic rural experience"),
    entry("yurt", "Traditional circular tents providing a unique glamping experience"),
    entry("safari_tent", "Luxury canvas tents inspired by African safaris for glamping adventures"),
    entry("converted_barn", "Renovated barns combining rustic charm with modern comfort"),
];

pub const AMENITIES: &[SeedEntry] = &[
    entry("pig_feeding", "Experience feeding and caring for pigs"),
    entry("crop_harvesting", "Participate in harvesting seasonal crops"),
    entry("dairy_milking", "Learn and experience dairy cow milking"),
    entry("chicken_coop", "Collect eggs and feed chickens"),
    entry("organic_garden", "Work in an organic vegetable garden"),
    entry("tractor_riding", "Experience riding farm tractors"),
    entry("beekeeping", "Learn about beekeeping and honey production"),
    entry("sheep_shearing", "Watch or participate in sheep shearing"),
];

/// Entries of `seeds` whose name is not in `existing`
pub fn missing<'a>(seeds: &'a [SeedEntry], existing: &[String]) -> Vec<&'a SeedEntry> {
    seeds
        .iter()
        .filter(|seed| !existing.iter().any(|name| name == seed.name))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_seed_sizes_and_unique_names() {
        assert_eq!(CATEGORIES.len(), 12);
        assert_eq!(AMENITIES.len(), 8);

        let names: HashSet<_> = CATEGORIES.iter().map(|c| c.name).collect();
        assert_eq!(names.len(), CATEGORIES.len());
    }

    #[test]
    fn test_missing_skips_existing_names() {
        let existing = vec!["cabin".to_string(), "yurt".to_string()];
        let todo = missing(CATEGORIES, &existing);

        assert_eq!(todo.len(), 10);
        assert!(todo.iter().all(|s| s.name != "cabin" && s.name != "yurt"));
    }
}

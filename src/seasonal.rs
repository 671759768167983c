use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Season {
    pub name: &'static str,
    pub months: &'static [u32],
    pub temperature: &'static str,
    pub highlights: &'static [&'static str],
    pub packing: &'static [&'static str],
}

pub const SEASONS: &[Season] = &[
    Season {
        name: "Spring",
        months: &[3, 4],
        temperature: "10°C to 20°C",
        highlights: &["Rhododendron bloom", "Orchard walks", "Clear mountain views"],
        packing: &["Light woollens", "Sunscreen"],
    },
    Season {
        name: "Summer",
        months: &[5, 6],
        temperature: "15°C to 25°C",
        highlights: &["Peak season escape from the plains", "Lake boating", "Night markets"],
        packing: &["Cotton clothes", "A light jacket for evenings"],
    },
    Season {
        name: "Monsoon",
        months: &[7, 8, 9],
        temperature: "14°C to 22°C",
        highlights: &["Waterfalls at full flow", "Misty forests", "Off-season hotel rates"],
        packing: &["Raincoat", "Waterproof shoes"],
    },
    Season {
        name: "Autumn",
        months: &[10, 11],
        temperature: "7°C to 18°C",
        highlights: &["Festival season", "Crisp trekking weather", "Apple harvest"],
        packing: &["Layered woollens", "Trekking shoes"],
    },
    Season {
        name: "Winter",
        months: &[12, 1, 2],
        temperature: "-3°C to 10°C",
        highlights: &["Snowfall", "Skiing on the upper slopes", "Bonfire evenings"],
        packing: &["Heavy woollens", "Thermals", "Snow boots"],
    },
];

/// Season for a calendar month (1-12); `None` outside that range.
pub fn season_for_month(month: u32) -> Option<&'static Season> {
    SEASONS.iter().find(|s| s.months.contains(&month))
}

//! NBA team reference data and venue geography.
//!
//! Two static tables: the franchise reference (stats id, full name,
//! abbreviation) and the fixed venue coordinates used for the
//! travel-distance feature. Both are immutable.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Mean Earth radius in statute miles.
const EARTH_RADIUS_MILES: f64 = 3958.7613;

/// One franchise entry of the team reference table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamInfo {
    /// NBA stats team identifier.
    pub id: u64,
    /// Full franchise name as used by bookmakers ("Boston Celtics").
    pub full_name: String,
    /// Three-letter abbreviation.
    pub abbreviation: String,
}

/// Lookup table over the franchise reference.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TeamReference {
    teams: Vec<TeamInfo>,
}

const NBA_TEAMS: [(u64, &str, &str); 30] = [
    (1_610_612_737, "Atlanta Hawks", "ATL"),
    (1_610_612_738, "Boston Celtics", "BOS"),
    (1_610_612_739, "Cleveland Cavaliers", "CLE"),
    (1_610_612_740, "New Orleans Pelicans", "NOP"),
    (1_610_612_741, "Chicago Bulls", "CHI"),
    (1_610_612_742, "Dallas Mavericks", "DAL"),
    (1_610_612_743, "Denver Nuggets", "DEN"),
    (1_610_612_744, "Golden State Warriors", "GSW"),
    (1_610_612_745, "Houston Rockets", "HOU"),
    (1_610_612_746, "Los Angeles Clippers", "LAC"),
    (1_610_612_747, "Los Angeles Lakers", "LAL"),
    (1_610_612_748, "Miami Heat", "MIA"),
    (1_610_612_749, "Milwaukee Bucks", "MIL"),
    (1_610_612_750, "Minnesota Timberwolves", "MIN"),
    (1_610_612_751, "Brooklyn Nets", "BKN"),
    (1_610_612_752, "New York Knicks", "NYK"),
    (1_610_612_753, "Orlando Magic", "ORL"),
    (1_610_612_754, "Indiana Pacers", "IND"),
    (1_610_612_755, "Philadelphia 76ers", "PHI"),
    (1_610_612_756, "Phoenix Suns", "PHX"),
    (1_610_612_757, "Portland Trail Blazers", "POR"),
    (1_610_612_758, "Sacramento Kings", "SAC"),
    (1_610_612_759, "San Antonio Spurs", "SAS"),
    (1_610_612_760, "Oklahoma City Thunder", "OKC"),
    (1_610_612_761, "Toronto Raptors", "TOR"),
    (1_610_612_762, "Utah Jazz", "UTA"),
    (1_610_612_763, "Memphis Grizzlies", "MEM"),
    (1_610_612_764, "Washington Wizards", "WAS"),
    (1_610_612_765, "Detroit Pistons", "DET"),
    (1_610_612_766, "Charlotte Hornets", "CHA"),
];

impl TeamReference {
    /// Build a reference from an arbitrary team list (e.g. a saved snapshot).
    pub fn new(teams: Vec<TeamInfo>) -> Self {
        Self { teams }
    }

    /// The built-in table of the 30 current NBA franchises.
    pub fn nba() -> Self {
        let teams = NBA_TEAMS
            .iter()
            .map(|&(id, full_name, abbreviation)| TeamInfo {
                id,
                full_name: full_name.to_string(),
                abbreviation: abbreviation.to_string(),
            })
            .collect();
        Self { teams }
    }

    pub fn teams(&self) -> &[TeamInfo] {
        &self.teams
    }

    pub fn len(&self) -> usize {
        self.teams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.teams.is_empty()
    }

    /// Map of team id to full name.
    pub fn id_to_full_name(&self) -> HashMap<u64, &str> {
        self.teams
            .iter()
            .map(|t| (t.id, t.full_name.as_str()))
            .collect()
    }

    /// Full name for a team id, falling back to the id itself as text.
    pub fn resolve_name(&self, id: u64) -> String {
        self.teams
            .iter()
            .find(|t| t.id == id)
            .map_or_else(|| id.to_string(), |t| t.full_name.clone())
    }
}

/// Venue coordinates (latitude, longitude) keyed by full team name.
///
/// The Clippers and Lakers share a venue.
const TEAM_LOCATIONS: [(&str, f64, f64); 30] = [
    ("Atlanta Hawks", 33.748_995, -84.387_982),
    ("Boston Celtics", 42.366_212, -71.062_193),
    ("Brooklyn Nets", 40.678_178, -73.944_158),
    ("Charlotte Hornets", 35.227_085, -80.843_124),
    ("Chicago Bulls", 41.881_832, -87.623_177),
    ("Cleveland Cavaliers", 41.4957, -81.6903),
    ("Dallas Mavericks", 32.776_665, -96.796_989),
    ("Denver Nuggets", 39.739_236, -104.990_251),
    ("Detroit Pistons", 42.331_429, -83.045_753),
    ("Golden State Warriors", 37.774_929, -122.419_416),
    ("Houston Rockets", 29.760_427, -95.369_803),
    ("Indiana Pacers", 39.768_403, -86.158_068),
    ("Los Angeles Clippers", 34.0430, -118.2673),
    ("Los Angeles Lakers", 34.0430, -118.2673),
    ("Memphis Grizzlies", 35.1382, -90.0505),
    ("Miami Heat", 25.7814, -80.1870),
    ("Milwaukee Bucks", 43.0436, -87.9172),
    ("Minnesota Timberwolves", 44.9795, -93.2762),
    ("New Orleans Pelicans", 29.9511, -90.0821),
    ("New York Knicks", 40.7505, -73.9934),
    ("Oklahoma City Thunder", 35.4634, -97.5151),
    ("Orlando Magic", 28.5392, -81.3839),
    ("Philadelphia 76ers", 39.9012, -75.1720),
    ("Phoenix Suns", 33.4457, -112.0712),
    ("Portland Trail Blazers", 45.5316, -122.6668),
    ("Sacramento Kings", 38.5802, -121.4997),
    ("San Antonio Spurs", 29.4271, -98.4375),
    ("Toronto Raptors", 43.6435, -79.3791),
    ("Utah Jazz", 40.7683, -111.9011),
    ("Washington Wizards", 38.9072, -77.0369),
];

/// Fixed venue coordinates of a team, in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TeamLocation {
    pub latitude: f64,
    pub longitude: f64,
}

impl TeamLocation {
    /// Look up a team's venue by full name.
    pub fn of(team: &str) -> Option<Self> {
        TEAM_LOCATIONS
            .iter()
            .find(|(name, _, _)| *name == team)
            .map(|&(_, latitude, longitude)| Self {
                latitude,
                longitude,
            })
    }

    /// Great-circle distance to another venue in miles (haversine).
    pub fn distance_miles(&self, other: &Self) -> f64 {
        let lat1 = self.latitude.to_radians();
        let lat2 = other.latitude.to_radians();
        let dlat = lat2 - lat1;
        let dlon = (other.longitude - self.longitude).to_radians();

        let a = (dlat / 2.0).sin().powi(2)
            + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
        EARTH_RADIUS_MILES * c
    }
}

/// Travel distance in miles between two teams' venues.
///
/// Returns 0 when either team is unknown or absent.
pub fn travel_distance(team: &str, other: Option<&str>) -> f64 {
    let Some(other) = other else {
        return 0.0;
    };
    match (TeamLocation::of(team), TeamLocation::of(other)) {
        (Some(a), Some(b)) => a.distance_miles(&b),
        _ => 0.0,
    }
}

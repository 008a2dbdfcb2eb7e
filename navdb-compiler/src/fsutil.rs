//! Runway name arithmetic, airport classification and ICAO flight plan
//! token helpers shared by the BGL and X-Plane writers.

use std::cmp::Ordering;
use std::sync::LazyLock;

use chrono::NaiveDateTime;
use regex::{Regex, RegexBuilder};

use crate::geometry;

mod aircraft_types;

pub use aircraft_types::aircraft_type_for_code;

// ── Runway names ─────────────────────────────────────────────────────────────

static RUNWAY_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([0-9]{1,2})([LRCWAB]?)(T?)$").expect("runway regex"));

static PARALLEL_RUNWAYS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^RW[0-9]{2}B$").expect("parallel runway regex"));

/// Decomposed runway designator like `09L` or `RW27T`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunwayName {
    pub number: u8,
    pub designator: String,
    pub true_heading: bool,
}

impl RunwayName {
    fn format(&self, number: u8) -> String {
        format!("{number:02}{}{}", self.designator, if self.true_heading { "T" } else { "" })
    }
}

/// Splits a runway name into number, designator and true heading flag.
/// A leading `RW` is ignored. Numbers outside `1..=36` fail.
pub fn runway_name_split(name: &str) -> Option<RunwayName> {
    let name = name.trim();
    let name = name.strip_prefix("RW").unwrap_or(name);
    let caps = RUNWAY_NAME.captures(name)?;
    let number: u8 = caps[1].parse().ok()?;
    if !(1..=36).contains(&number) {
        return None;
    }
    Some(RunwayName {
        number,
        designator: caps[2].to_string(),
        true_heading: !caps[3].is_empty(),
    })
}

/// `RW9L` and `9LT` become `09L`. Other names lose `RW` and a trailing `T`
/// and one or two letter names get a leading zero like numbers do, so the
/// water runway `N` becomes `0N`.
pub fn normalize_runway(name: &str) -> String {
    let upper = name.trim().to_ascii_uppercase();
    if let Some(rw) = runway_name_split(&upper) {
        return format!("{:02}{}", rw.number, rw.designator);
    }
    let name = upper.strip_prefix("RW").unwrap_or(&upper);
    let name = name.strip_suffix('T').unwrap_or(name);
    let bytes = name.as_bytes();
    if bytes.len() == 1 || (bytes.len() == 2 && !bytes[1].is_ascii_digit()) {
        format!("0{name}")
    } else {
        name.to_string()
    }
}

/// Two digit runway number, keeping designator and true flag.
pub fn runway_name_prefix_zero(name: &str) -> String {
    match runway_name_split(name) {
        Some(rw) => rw.format(rw.number),
        None => name.to_string(),
    }
}

/// The name itself followed by the neighbour numbers (`04` → `05`, `03`).
/// Wraps around between 36 and 01 and keeps an `RW` prefix.
pub fn runway_name_variants(name: &str) -> Vec<String> {
    let mut variants = vec![name.to_string()];
    if let Some(rw) = runway_name_split(name) {
        let prefix = if name.trim().starts_with("RW") { "RW" } else { "" };
        let next = if rw.number < 36 { rw.number + 1 } else { 1 };
        let prev = if rw.number > 1 { rw.number - 1 } else { 36 };
        variants.push(format!("{prefix}{}", rw.format(next)));
        variants.push(format!("{prefix}{}", rw.format(prev)));
    }
    variants
}

/// `9L` ↔ `09L`.
pub fn runway_name_zero_prefix_variants(name: &str) -> Vec<String> {
    let mut variants = vec![name.to_string()];
    if let Some(stripped) = name.strip_prefix('0') {
        variants.push(stripped.to_string());
    } else if runway_name_split(name).is_some_and(|rw| rw.number < 10) {
        variants.push(format!("0{name}"));
    }
    variants
}

/// Compares normalized names. `fuzzy` also accepts the neighbour numbers.
pub fn runway_equal(a: &str, b: &str, fuzzy: bool) -> bool {
    let nb = normalize_runway(b);
    if fuzzy {
        runway_name_variants(a).iter().any(|v| normalize_runway(v) == nb)
    } else {
        normalize_runway(a) == nb
    }
}

pub fn runway_contains(runways: &[String], name: &str, fuzzy: bool) -> bool {
    runways.iter().any(|rw| runway_equal(name, rw, fuzzy))
}

/// Airport runway matching `name`, trying the exact name first and then the
/// neighbour numbers. Needed where navdata and scenery disagree after a
/// magnetic variation change.
pub fn runway_best_fit(name: &str, airport_runways: &[String]) -> Option<String> {
    if let Some(exact) = airport_runways.iter().find(|rw| runway_equal(name, rw, false)) {
        return Some(exact.clone());
    }
    runway_name_variants(name)
        .iter()
        .find_map(|v| airport_runways.iter().find(|rw| runway_equal(v, rw, false)).cloned())
}

/// Orders by number, then designator. Unparseable names sort last.
pub fn compare_runway_number(a: &str, b: &str) -> Ordering {
    match (runway_name_split(a), runway_name_split(b)) {
        (Some(ra), Some(rb)) => ra.number.cmp(&rb.number).then_with(|| ra.designator.cmp(&rb.designator)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}

/// `ALL` or empty runway of a SID/STAR transition.
pub fn has_sid_star_all_runways(name: &str) -> bool {
    let name = name.trim();
    name.is_empty() || name == "ALL"
}

/// `RW04B`: both parallel runways.
pub fn has_sid_star_parallel_runways(name: &str) -> bool {
    PARALLEL_RUNWAYS.is_match(name.trim())
}

/// Airport runways a multi-runway SID/STAR transition applies to, or `None`
/// for a transition that names a single runway.
pub fn sid_star_multi_runways(airport_runways: &[String], name: &str) -> Option<Vec<String>> {
    if has_sid_star_all_runways(name) {
        return Some(airport_runways.to_vec());
    }
    if has_sid_star_parallel_runways(name) {
        let number = &name.trim()[2..4];
        return Some(
            airport_runways
                .iter()
                .filter(|rw| normalize_runway(rw).starts_with(number))
                .cloned()
                .collect(),
        );
    }
    None
}

static ILS_NAME_NOISE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(IGS|ILS[XYZ]?|LOC|CAT|I{1,3}|RUNWAY|RWY)\b").expect("ils name regex")
});
static RW_PREFIX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\bRW(\d)").expect("rw prefix regex"));

/// Runway of an MSFS localizer from its name, like `ILS RWY 16R CAT II`.
pub fn ils_runway_name_from_name(ils_name: &str) -> Option<String> {
    let upper = ils_name.to_uppercase();
    let stripped = ILS_NAME_NOISE.replace_all(&upper, " ");
    let stripped = RW_PREFIX.replace_all(&stripped, "$1");
    let candidate: String = stripped.chars().filter(|c| !c.is_whitespace()).collect();
    runway_name_split(&candidate).map(|_| normalize_runway(&candidate))
}

// ── Airport classification ───────────────────────────────────────────────────

static CLOSED_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\[X\]|\bCLSD\b|\bCLOSED\b)").expect("closed regex"));

const CONTAINS_MIL: &[&str] = &["MILITÄR", "BASE AÉREA", "BASE AÉRIENNE", "BASE AEREA", "BAZA LOTNICZA", "[M]", "[MIL]"];

static MILITARY_NAME: LazyLock<Regex> = LazyLock::new(|| {
    let words = [
        "AAC", "AAF", "AB", "AFB", "AFLD", "AFS", "AF", "AHP", "AIR BASE", "AIR FORCE", "AIRBASE", "ANGB", "ARB",
        "ARMY", "CFB", "LRRS", "MCAF", "MCALF", "MCAS", "MILITARY", "MIL", "NAF", "NALF", "NAS", "NAVAL", "NAVY",
        "NAWS", "NOLF", "NSB", "NSF", "NSWC", "NSY", "NS", "NWS", "PMRF", "RAF", "RNAS", "ROYAL MARINES",
    ];
    RegexBuilder::new(&format!(r"\b({})\b", words.join("|")))
        .build()
        .expect("military regex")
});

pub fn is_name_closed(name: &str) -> bool {
    CLOSED_NAME.is_match(&name.to_uppercase())
}

pub fn is_name_military(name: &str) -> bool {
    let upper = name.to_uppercase();
    CONTAINS_MIL.iter().any(|m| upper.contains(m)) || MILITARY_NAME.is_match(&upper)
}

/// Zero to five stars for the amount of scenery detail.
pub fn calculate_airport_rating(
    is_addon: bool,
    has_tower: bool,
    msfs: bool,
    num_taxi_paths: usize,
    num_parkings: usize,
    num_aprons: usize,
) -> i32 {
    let mut rating = i32::from(num_taxi_paths > 0)
        + i32::from(num_parkings > 0)
        + i32::from(num_aprons > 0)
        + i32::from(is_addon);
    // Generated MSFS airports often carry nothing but apron snippets
    if msfs && !is_addon && num_taxi_paths == 0 && num_parkings == 0 {
        rating = 0;
    }
    // Tower only counts on top of other detail
    if rating > 0 && has_tower {
        rating += 1;
    }
    rating
}

/// X-Plane variant. 3D airports of the gateway count like add-ons.
pub fn calculate_airport_rating_xp(
    is_addon: bool,
    is_3d: bool,
    has_tower: bool,
    num_taxi_paths: usize,
    num_parkings: usize,
    num_aprons: usize,
) -> i32 {
    let mut rating = i32::from(num_taxi_paths > 0)
        + i32::from(num_parkings > 0)
        + i32::from(num_aprons > 0)
        + i32::from(is_addon || is_3d);
    if rating > 0 && has_tower {
        rating += 1;
    }
    rating
}

// ── Idents ───────────────────────────────────────────────────────────────────

static VALID_IDENT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Z0-9]{1,5}$").expect("ident regex"));
static AIRCRAFT_TYPE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Z0-9]{2,4}$").expect("type regex"));

pub fn adjust_ident(ident: &str) -> String {
    ident.trim().to_ascii_uppercase()
}

/// Two letter ICAO region from the first two alphanumeric characters or
/// `ZZ` if there are not enough.
pub fn adjust_region(region: &str) -> String {
    let region: String = region
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_uppercase())
        .take(2)
        .collect();
    if region.len() == 2 { region } else { "ZZ".to_string() }
}

pub fn is_valid_ident(ident: &str) -> bool {
    VALID_IDENT.is_match(ident)
}

pub fn is_valid_region(region: &str) -> bool {
    region.len() == 2 && region.chars().all(|c| c.is_ascii_alphanumeric())
}

pub fn is_aircraft_type_designator_valid(designator: &str) -> bool {
    AIRCRAFT_TYPE.is_match(designator)
}

/// Squawk written in decimal digits, like `7700`, as octal value.
pub fn decode_transponder_code(code: u32) -> Option<u16> {
    if code > 7777 {
        return None;
    }
    let mut value = 0u16;
    for digit in format!("{code}").chars() {
        let d = digit.to_digit(10)?;
        if d > 7 {
            return None;
        }
        value = value * 8 + d as u16;
    }
    Some(value)
}

/// X-Plane packs ARINC 424 columns 31 to 33 into an integer, column 31 in
/// the lowest byte.
pub fn waypoint_flags_from_xplane(flags: &str, default: &str) -> String {
    match flags.trim().parse::<u32>() {
        Ok(num) if num > 0 => {
            let text: String = num
                .to_le_bytes()
                .iter()
                .take(3)
                .map(|&b| if b == 0 { ' ' } else { char::from(b) })
                .collect();
            text.trim_end().to_string()
        }
        _ => default.to_string(),
    }
}

pub fn waypoint_flags_to_xplane(flags: &str) -> u32 {
    flags
        .bytes()
        .take(3)
        .enumerate()
        .filter(|(_, b)| *b != b' ')
        .fold(0, |acc, (i, b)| acc | (u32::from(b) << (8 * i)))
}

pub fn round_com_frequency(frequency_khz: u32) -> u32 {
    // 8.33 kHz channels are stored with three decimals
    (frequency_khz + 2) / 5 * 5
}

// ── Speed and altitude tokens ────────────────────────────────────────────────

static SPEED_ALTITUDE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([NMK])(\d{2,4})(([FSAM])(\d{2,4}))?$").expect("speed regex"));

/// Decoded `N0490F360` token. Values only count where the flag is set.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SpeedAltitude {
    pub speed_kts: f32,
    pub altitude_ft: f32,
    pub speed_ok: bool,
    pub alt_ok: bool,
}

/// True airspeed for a mach number in the standard atmosphere.
pub fn mach_to_tas(mach: f32, altitude_ft: f32) -> f32 {
    let temp = (288.15 - 0.001_981_2 * f64::from(altitude_ft)).max(216.65);
    (f64::from(mach) * 661.4786 * (temp / 288.15).sqrt()) as f32
}

pub fn extract_speed_and_altitude(token: &str) -> SpeedAltitude {
    let mut result = SpeedAltitude::default();
    let Some(caps) = SPEED_ALTITUDE.captures(token.trim()) else {
        return result;
    };

    if let (Some(alt_type), Some(alt_value)) = (caps.get(4), caps.get(5)) {
        if let Ok(value) = alt_value.as_str().parse::<f32>() {
            result.alt_ok = true;
            result.altitude_ft = match alt_type.as_str() {
                "F" | "A" if value >= 1000.0 => value,
                "F" | "A" => value * 100.0,
                _ => geometry::meter_to_feet(f64::from(value) * 10.0) as f32,
            };
        }
    }

    if let Ok(value) = caps[2].parse::<f32>() {
        result.speed_ok = true;
        result.speed_kts = match &caps[1] {
            "K" => (f64::from(value) * 1000.0 / geometry::NM_TO_METER) as f32,
            "M" => mach_to_tas(value / 100.0, result.altitude_ft),
            _ => value,
        };
    }
    result
}

/// Inverse of [`extract_speed_and_altitude`] for knots/km/h and feet/meters.
pub fn create_speed_and_altitude(speed_kts: f32, altitude_ft: f32, metric_speed: bool, metric_alt: bool) -> String {
    let speed = if metric_speed {
        format!("K{:04.0}", f64::from(speed_kts) * geometry::NM_TO_METER / 1000.0)
    } else {
        format!("N{:04.0}", speed_kts)
    };
    let altitude = if metric_alt {
        let tens_of_meters = geometry::feet_to_meter(f64::from(altitude_ft)) / 10.0;
        // Metric flight levels start at 5486 ft
        if f64::from(altitude_ft) < geometry::feet_to_meter(18_000.0) {
            format!("M{tens_of_meters:04.0}")
        } else {
            format!("S{tens_of_meters:03.0}")
        }
    } else if altitude_ft < 18_000.0 {
        format!("A{:03.0}", altitude_ft / 100.0)
    } else {
        format!("F{:03.0}", altitude_ft / 100.0)
    };
    speed + &altitude
}

// ── X-Plane weather file names ───────────────────────────────────────────────

static GRIB_FILENAME: LazyLock<Regex> = LazyLock::new(|| {
    RegexBuilder::new(r"^GRIB-(\d+)-(\d+)-(\d+)-(\d+)\.(\d+)(-ZULU)?-wind(-v\d+)?\.grib$")
        .case_insensitive(true)
        .build()
        .expect("grib regex")
});

static METAR_FILENAME: LazyLock<Regex> = LazyLock::new(|| {
    RegexBuilder::new(r"METAR-(\d+)-(\d+)-(\d+)-(\d+)\.(\d+)(-ZULU)?\.txt$")
        .case_insensitive(true)
        .build()
        .expect("metar regex")
});

fn filename_date(re: &Regex, filename: &str) -> Option<NaiveDateTime> {
    let caps = re.captures(filename)?;
    let num = |i: usize| caps[i].parse::<u32>().ok();
    let date = chrono::NaiveDate::from_ymd_opt(caps[1].parse().ok()?, num(2)?, num(3)?)?;
    date.and_hms_opt(num(4)?, num(5)?, 0)
}

/// `GRIB-2022-9-6-21.00-ZULU-wind-v2.grib`
pub fn xp_grib_filename_to_date(filename: &str) -> Option<NaiveDateTime> {
    filename_date(&GRIB_FILENAME, filename)
}

/// `METAR-2022-9-6-21.00-ZULU.txt`
pub fn xp_metar_filename_to_date(filename: &str) -> Option<NaiveDateTime> {
    filename_date(&METAR_FILENAME, filename)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn prefix_zero_keeps_normalized_name() {
        for name in ["9", "9L", "09L", "RW9", "RW27T", "36C", "N", "NE", "H1", "27"] {
            assert_eq!(normalize_runway(&runway_name_prefix_zero(name)), normalize_runway(name), "{name}");
        }
        assert_eq!(runway_name_prefix_zero("9L"), "09L");
        assert_eq!(runway_name_prefix_zero("NW"), "NW");
    }

    #[test]
    fn normalize() {
        assert_eq!(normalize_runway("RW9L"), "09L");
        assert_eq!(normalize_runway("27T"), "27");
        assert_eq!(normalize_runway("rw36"), "36");
        assert_eq!(normalize_runway("N"), "0N");
        assert_eq!(normalize_runway("RWNE"), "0NE");
        assert_eq!(normalize_runway("H1"), "H1");
        assert_eq!(normalize_runway(""), "");
    }

    #[test]
    fn name_variants_wrap() {
        assert_eq!(runway_name_variants("04"), vec!["04", "05", "03"]);
        assert_eq!(runway_name_variants("RW36L"), vec!["RW36L", "RW01L", "RW35L"]);
        assert_eq!(runway_name_variants("1"), vec!["1", "02", "36"]);
        assert_eq!(runway_name_variants("NE"), vec!["NE"]);
    }

    #[test]
    fn split_rejects_invalid() {
        assert_eq!(
            runway_name_split("RW09LT"),
            Some(RunwayName { number: 9, designator: "L".into(), true_heading: true })
        );
        assert!(runway_name_split("37").is_none());
        assert!(runway_name_split("00").is_none());
        assert!(runway_name_split("09X").is_none());
    }

    #[test]
    fn zero_prefix_variants() {
        assert_eq!(runway_name_zero_prefix_variants("09L"), vec!["09L", "9L"]);
        assert_eq!(runway_name_zero_prefix_variants("9L"), vec!["9L", "09L"]);
        assert_eq!(runway_name_zero_prefix_variants("27"), vec!["27"]);
    }

    #[test]
    fn best_fit_uses_neighbours() {
        let runways: Vec<String> = ["05L", "23R", "14"].iter().map(|s| s.to_string()).collect();
        assert_eq!(runway_best_fit("5L", &runways).as_deref(), Some("05L"));
        assert_eq!(runway_best_fit("04L", &runways).as_deref(), Some("05L"));
        assert_eq!(runway_best_fit("13", &runways).as_deref(), Some("14"));
        assert_eq!(runway_best_fit("32", &runways), None);
        assert!(runway_contains(&runways, "RW14", false));
        assert!(runway_equal("22R", "23R", true));
        assert!(!runway_equal("22R", "23R", false));
    }

    #[test]
    fn runway_ordering() {
        let mut names = vec!["27", "09R", "N", "09L"];
        names.sort_by(|a, b| compare_runway_number(a, b));
        assert_eq!(names, vec!["09L", "09R", "27", "N"]);
    }

    #[test]
    fn sid_star_runways() {
        let runways: Vec<String> = ["04L", "04R", "22L", "22R"].iter().map(|s| s.to_string()).collect();
        assert!(has_sid_star_all_runways("ALL"));
        assert!(has_sid_star_parallel_runways("RW04B"));
        assert_eq!(sid_star_multi_runways(&runways, "RW04B"), Some(vec!["04L".to_string(), "04R".to_string()]));
        assert_eq!(sid_star_multi_runways(&runways, "ALL").map(|r| r.len()), Some(4));
        assert_eq!(sid_star_multi_runways(&runways, "RW22L"), None);
    }

    #[test]
    fn ils_name_runway() {
        assert_eq!(ils_runway_name_from_name("ILS RWY 16R CAT II").as_deref(), Some("16R"));
        assert_eq!(ils_runway_name_from_name("IGS 13").as_deref(), Some("13"));
        assert_eq!(ils_runway_name_from_name("LOC RW9").as_deref(), Some("09"));
        assert_eq!(ils_runway_name_from_name("ILSZ 28L").as_deref(), Some("28L"));
        assert_eq!(ils_runway_name_from_name("SEATTLE"), None);
    }

    #[test]
    fn closed_and_military_names() {
        assert!(is_name_closed("Old Field [X]"));
        assert!(is_name_closed("Marine Airpark (Closed)"));
        assert!(!is_name_closed("Closeburn"));
        assert!(is_name_military("Whidbey Island NAS"));
        assert!(is_name_military("Ramstein Air Base"));
        assert!(is_name_military("Base Aérea de Gando"));
        assert!(!is_name_military("Nashville Intl"));
        assert!(!is_name_military("Abbotsford"));
    }

    #[test]
    fn airport_rating() {
        assert_eq!(calculate_airport_rating(false, false, false, 0, 0, 0), 0);
        // Tower alone does not make a rating
        assert_eq!(calculate_airport_rating(false, true, false, 0, 0, 0), 0);
        assert_eq!(calculate_airport_rating(true, true, false, 10, 4, 2), 5);
        assert_eq!(calculate_airport_rating(false, false, true, 1, 1, 1), 3);
        assert_eq!(calculate_airport_rating(false, false, false, 1, 1, 1), 3);
        // Generated MSFS airports with apron only
        assert_eq!(calculate_airport_rating(false, true, true, 0, 0, 2), 0);
        assert_eq!(calculate_airport_rating(true, true, true, 0, 0, 2), 3);
        assert_eq!(calculate_airport_rating_xp(false, true, true, 1, 0, 0), 3);
    }

    #[test]
    fn speed_and_altitude_token() {
        let sa = extract_speed_and_altitude("N0490F360");
        assert!(sa.speed_ok && sa.alt_ok);
        assert_eq!(sa.speed_kts, 490.0);
        assert_eq!(sa.altitude_ft, 36000.0);
        assert_eq!(create_speed_and_altitude(490.0, 36000.0, false, false), "N0490F360");
        assert_eq!(create_speed_and_altitude(250.0, 9000.0, false, false), "N0250A090");

        let metric = extract_speed_and_altitude("K0830S1130");
        assert!((metric.speed_kts - 448.2).abs() < 0.1, "{}", metric.speed_kts);
        assert!((metric.altitude_ft - 37073.0).abs() < 1.0, "{}", metric.altitude_ft);

        let mach = extract_speed_and_altitude("M082F350");
        assert!((mach.speed_kts - 473.0).abs() < 2.0, "{}", mach.speed_kts);

        let speed_only = extract_speed_and_altitude("N0490");
        assert!(speed_only.speed_ok);
        assert!(!speed_only.alt_ok);
        assert_eq!(speed_only.altitude_ft, 0.0);
        assert!(!extract_speed_and_altitude("X0490F360").speed_ok);
    }

    #[test]
    fn metric_speed_and_altitude_token() {
        // 1500 ft is below the metric threshold, 11300 m flight level is above
        assert_eq!(create_speed_and_altitude(250.0, 1500.0, true, true), "K0463M0046");
        assert_eq!(create_speed_and_altitude(450.0, 37073.0, false, true), "N0450S1130");
        assert_eq!(create_speed_and_altitude(450.0, 9000.0, false, true), "N0450S274");
    }

    #[test]
    fn transponder_codes() {
        assert_eq!(decode_transponder_code(7700), Some(0o7700));
        assert_eq!(decode_transponder_code(1200), Some(0o1200));
        assert_eq!(decode_transponder_code(7800), None);
        assert_eq!(decode_transponder_code(17777), None);
    }

    #[test]
    fn xplane_waypoint_flags() {
        // "E", "H", blank
        assert_eq!(waypoint_flags_from_xplane("18501", "X"), "EH");
        assert_eq!(waypoint_flags_from_xplane("0", "X"), "X");
        assert_eq!(waypoint_flags_from_xplane("abc", ""), "");
        assert_eq!(waypoint_flags_to_xplane("EH"), 18501);
        assert_eq!(waypoint_flags_to_xplane("V W"), 0x0057_0056);
    }

    #[test]
    fn idents() {
        assert_eq!(adjust_region(" k1 "), "K1");
        assert_eq!(adjust_region("ENRT"), "EN");
        assert_eq!(adjust_region("K"), "ZZ");
        assert_eq!(adjust_region(" -1 "), "ZZ");
        assert!(is_valid_ident("KSEA"));
        assert!(!is_valid_ident("KSEA12"));
        assert!(is_valid_region("ED"));
        assert!(is_aircraft_type_designator_valid("B738"));
        assert!(!is_aircraft_type_designator_valid("b738x"));
        assert_eq!(adjust_ident(" sea "), "SEA");
        assert_eq!(round_com_frequency(118_697), 118_695);
    }

    #[test]
    fn weather_file_dates() {
        let expected = NaiveDate::from_ymd_opt(2022, 9, 6).unwrap().and_hms_opt(21, 0, 0).unwrap();
        assert_eq!(xp_grib_filename_to_date("GRIB-2022-9-6-21.00-ZULU-wind-v2.grib"), Some(expected));
        assert_eq!(xp_grib_filename_to_date("grib-2022-9-6-21.00-wind.grib"), Some(expected));
        assert_eq!(xp_metar_filename_to_date("METAR-2022-9-6-21.00-ZULU.txt"), Some(expected));
        assert_eq!(xp_metar_filename_to_date("METAR-2022-13-6-21.00.txt"), None);
        assert_eq!(xp_grib_filename_to_date("wind.grib"), None);
    }
}

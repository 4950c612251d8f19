//! Feature column catalog accepted by the classification service.
//!
//! `REQUIRED_HEADERS` is the full feature set the service expects, in the
//! order used for the blank template. `OPTIONAL_HEADERS` may accompany it
//! (ground-truth `label` for evaluation and retraining). Together they form
//! the allow-list: any other column is kept locally but never sent.

use std::collections::HashSet;

/// Ground-truth column used for evaluation and retraining.
pub const LABEL_COLUMN: &str = "label";

/// Column added locally after a batch classification.
pub const PREDICTION_COLUMN: &str = "prediction";

pub const REQUIRED_HEADERS: &[&str] = &[
    "koi_fpflag_ss", "koi_duration_err2", "pl_tranmiderr2", "sy_gaiamagerr1", "st_pmraerr1",
    "st_masserr1", "koi_duration_err1", "koi_fpflag_co", "star_logg", "st_distlim", "st_met",
    "star_rad", "st_dist", "koi_depth", "star_logg_err1", "pl_orbsmax", "st_tefflim",
    "pl_trandeperr2", "st_tmagerr1", "koi_insol_err2", "koi_tce_plnt_num", "pl_orbsmaxlim",
    "st_masserr2", "pl_trandurherr1", "ra", "sy_snum", "st_logglim", "star_rad_err2", "koi_teq",
    "pl_radjlim", "koi_time0bk_err1", "st_pmralim", "st_tmaglim", "sy_pnum", "pl_orbsmaxerr2",
    "koi_impact", "pl_insol", "pl_radjerr2", "star_rad_err1", "planet_radius_err1",
    "koi_duration", "pl_orbsmaxerr1", "sy_disterr1", "st_pmdeclim", "st_pmra", "ttv_flag",
    "st_meterr1", "default_flag", "koi_depth_err1", "star_logg_err2", "sy_vmagerr2", "dec",
    "tce_q1_q17_dr25_tce", "pl_trandep", "planet_radius_err2", "st_metlim", "pl_trandurherr2",
    "sy_dist", "pl_tranmidlim", "orb_period_err2", "star_teff", "star_teff_err1",
    "tce_q1_q17_dr24_tce", "pl_radjerr1", "pl_orbperlim", "st_mass", "st_masslim", "sy_gaiamag",
    "koi_time0bk", "koi_insol", "koi_time0bk_err2", "sy_kmag", "kepmag", "koi_fpflag_ec",
    "pl_trandurh", "sy_vmagerr1", "koi_fpflag_nt", "st_tmagerr2", "orb_period", "koi_model_snr",
    "koi_depth_err2", "sy_kmagerr1", "st_pmdecerr1", "pl_trandeperr1", "st_pmdec",
    "koi_impact_err1", "pl_tranmid", "pl_trandeplim", "pl_eqt", "koi_insol_err1",
    "planet_radius", "sy_vmag", "orb_period_err1", "st_radlim", "pl_radj", "sy_kmagerr2",
    "st_disterr2", "star_teff_err2", "st_meterr2", "sy_gaiamagerr2", "pl_trandurhlim",
    "st_pmdecerr2", "koi_impact_err2", "st_tmag", "st_disterr1", "pl_tranmiderr1",
    "sy_disterr2", "pl_radelim", "st_pmraerr2",
];

/// Features a single-entry classification cannot go without.
pub const IMPORTANT_HEADERS: &[&str] = &[
    "orb_period",
    "orb_period_err1",
    "orb_period_err2",
    "planet_radius",
    "planet_radius_err1",
    "planet_radius_err2",
    "star_teff",
    "star_teff_err1",
    "star_teff_err2",
    "star_logg",
    "star_logg_err1",
    "star_logg_err2",
    "star_rad",
    "star_rad_err1",
    "star_rad_err2",
    "ra",
    "dec",
];

pub const OPTIONAL_HEADERS: &[&str] = &[LABEL_COLUMN];

/// A named cluster of related input columns, used for form layout and the
/// influence overview. Groups carry no modelling meaning.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureGroup {
    pub key: &'static str,
    pub display_name: &'static str,
    pub novice_tip: &'static str,
    pub formal_title: &'static str,
    pub purpose: &'static str,
    /// Relative influence in percent
    pub influence: u8,
    pub columns: &'static [&'static str],
}

pub const FEATURE_GROUPS: &[FeatureGroup] = &[
    FeatureGroup {
        key: "geom",
        display_name: "Transit Shape & Timing",
        novice_tip: "How deep, long, and regular the dimming is",
        formal_title: "Transit Event Geometry & Timing",
        purpose: "Describes how the planet crosses the star.",
        influence: 22,
        columns: &[
            "pl_tranmid", "pl_tranmiderr1", "pl_tranmiderr2", "pl_tranmidlim",
            "pl_trandep", "pl_trandeperr1", "pl_trandeperr2", "pl_trandurh", "pl_trandurherr1",
            "pl_trandurherr2", "pl_trandurhlim",
            "koi_duration", "koi_duration_err1", "koi_duration_err2",
            "koi_time0bk", "koi_time0bk_err1", "koi_time0bk_err2",
            "koi_depth", "koi_depth_err1", "koi_depth_err2",
            "koi_impact", "koi_impact_err1", "koi_impact_err2",
        ],
    },
    FeatureGroup {
        key: "orbit",
        display_name: "Orbit & Planet Size Estimates",
        novice_tip: "How big and how far the object likely is",
        formal_title: "Orbital & Physical Characteristics",
        purpose: "Planet's orbit and estimated physical size/temperature.",
        influence: 24,
        columns: &[
            "orb_period", "orb_period_err1", "orb_period_err2", "pl_orbperlim",
            "pl_orbsmax", "pl_orbsmaxerr1", "pl_orbsmaxerr2", "pl_orbsmaxlim",
            "pl_radj", "pl_radjerr1", "pl_radjerr2", "pl_radjlim", "pl_radelim",
            "planet_radius", "planet_radius_err1", "planet_radius_err2",
            "pl_eqt", "koi_teq", "pl_insol", "koi_insol", "koi_insol_err1", "koi_insol_err2",
        ],
    },
    FeatureGroup {
        key: "star",
        display_name: "Host Star Properties",
        novice_tip: "What kind of star it orbits: hot? big? metal-rich?",
        formal_title: "Stellar Properties (Inputs from Host Star)",
        purpose: "Planetary likelihood inferred from host star context.",
        influence: 18,
        columns: &[
            "star_teff", "star_teff_err1", "star_teff_err2", "st_tefflim", "st_tmaglim",
            "star_logg", "star_logg_err1", "star_logg_err2", "st_logglim",
            "star_rad", "star_rad_err1", "star_rad_err2", "st_radlim",
            "st_mass", "st_masserr1", "st_masserr2", "st_masslim",
            "st_met", "st_meterr1", "st_meterr2", "st_metlim",
        ],
    },
    FeatureGroup {
        key: "quality",
        display_name: "Signal Quality & False-Positive Flags",
        novice_tip: "How trustworthy the detection is",
        formal_title: "Signal Quality / Detection Confidence",
        purpose: "Measures how reliable the transit signal is.",
        influence: 16,
        columns: &[
            "koi_model_snr", "pl_trandeplim", "default_flag",
            "koi_fpflag_co", "koi_fpflag_nt", "koi_fpflag_ec", "koi_fpflag_ss",
            "ttv_flag", "tce_q1_q17_dr25_tce", "tce_q1_q17_dr24_tce",
        ],
    },
    FeatureGroup {
        key: "motion",
        display_name: "Star Motion & Background Check",
        novice_tip: "Ensures the dip isn't from another star",
        formal_title: "Stellar Motion & Distance",
        purpose: "Helps eliminate background blends or nearby star contamination.",
        influence: 10,
        columns: &[
            "ra", "dec",
            "st_pmra", "st_pmraerr1", "st_pmraerr2", "st_pmralim",
            "st_pmdec", "st_pmdecerr1", "st_pmdecerr2", "st_pmdeclim",
            "sy_dist", "sy_disterr1", "sy_disterr2", "st_dist", "st_distlim", "st_disterr1",
            "st_disterr2",
        ],
    },
    FeatureGroup {
        key: "mags",
        display_name: "Brightness Across Sensors",
        novice_tip: "Multiple instruments confirm the visibility",
        formal_title: "Photometric Magnitudes (Brightness Across Instruments)",
        purpose: "Determines data quality from various sensors.",
        influence: 10,
        columns: &[
            "sy_vmag", "sy_vmagerr1", "sy_vmagerr2",
            "sy_kmag", "sy_kmagerr1", "sy_kmagerr2",
            "sy_gaiamag", "sy_gaiamagerr1", "sy_gaiamagerr2",
            "kepmag", "st_tmag", "st_tmagerr1", "st_tmagerr2",
        ],
    },
    FeatureGroup {
        key: "system",
        display_name: "System Context (Companions / Multi-planet)",
        novice_tip: "Checks if the star has multiple planets or companion stars",
        formal_title: "Planetary System Multiplicity & Architecture",
        purpose: "Multi-planet systems tend to have higher exoplanet likelihood.",
        influence: 5,
        columns: &["koi_tce_plnt_num", "sy_snum", "sy_pnum"],
    },
];

/// The allow-listed header set (required features plus optional columns).
pub fn allowed_headers() -> HashSet<&'static str> {
    REQUIRED_HEADERS
        .iter()
        .chain(OPTIONAL_HEADERS.iter())
        .copied()
        .collect()
}

pub fn is_allowed(header: &str) -> bool {
    REQUIRED_HEADERS.contains(&header) || OPTIONAL_HEADERS.contains(&header)
}

pub fn is_important(header: &str) -> bool {
    IMPORTANT_HEADERS.contains(&header)
}

/// Binary false-positive / flag columns take only 0 or 1.
pub fn is_flag_column(column: &str) -> bool {
    column.contains("fpflag") || column.ends_with("_flag")
}

/// Every column referenced by a feature group, first occurrence wins.
pub fn feature_columns() -> Vec<&'static str> {
    let mut seen = HashSet::new();
    FEATURE_GROUPS
        .iter()
        .flat_map(|g| g.columns.iter().copied())
        .filter(|c| seen.insert(*c))
        .collect()
}

/// Blank CSV template: the required header row and nothing else.
pub fn template_csv() -> String {
    let mut out = REQUIRED_HEADERS.join(",");
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allow_list_contains_label_but_not_prediction() {
        let allowed = allowed_headers();
        assert!(allowed.contains(LABEL_COLUMN));
        assert!(!allowed.contains(PREDICTION_COLUMN));
        assert_eq!(allowed.len(), REQUIRED_HEADERS.len() + OPTIONAL_HEADERS.len());
    }

    #[test]
    fn test_important_headers_are_required() {
        for h in IMPORTANT_HEADERS {
            assert!(REQUIRED_HEADERS.contains(h), "{h} missing from REQUIRED_HEADERS");
        }
    }

    #[test]
    fn test_feature_columns_cover_required_set() {
        let cols = feature_columns();
        for h in REQUIRED_HEADERS {
            assert!(cols.contains(h), "{h} not in any feature group");
        }
        let unique: HashSet<_> = cols.iter().collect();
        assert_eq!(unique.len(), cols.len());
    }

    #[test]
    fn test_flag_columns() {
        assert!(is_flag_column("koi_fpflag_ss"));
        assert!(is_flag_column("ttv_flag"));
        assert!(is_flag_column("default_flag"));
        assert!(!is_flag_column("orb_period"));
    }

    #[test]
    fn test_template_is_single_header_line() {
        let csv = template_csv();
        assert!(csv.ends_with('\n'));
        assert_eq!(csv.lines().count(), 1);
        assert!(csv.starts_with("koi_fpflag_ss,koi_duration_err2,"));
    }

    #[test]
    fn test_group_influence_total() {
        let total: u32 = FEATURE_GROUPS.iter().map(|g| g.influence as u32).sum();
        assert_eq!(total, 105);
    }
}

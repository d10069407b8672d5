//! Name resolution from authored mesh blendshape names onto [`FaceChannel`]s.
//!
//! Two naming generations exist in the avatar catalogue:
//! - generation 13 uses FACS-like upper snake case (`headOnly_geo_blendShape.LIPS_TOWARD`),
//! - generation 12 uses the canonical channel names with a lowercase first letter
//!   (`headOnly_geo_blendShape.jawOpen`).
//!
//! Some authored shapes are finer grained than the canonical vocabulary. Those are folded onto
//! a single channel by the merge rules, which are checked before the exact-name table.

use std::sync::LazyLock;

use bevy::platform::collections::HashMap;
use regex::Regex;

use super::FaceChannel;

const MERGE_RULES: &[(&str, FaceChannel)] = &[
    (
        r"^(CHEEK_PUFF_[LR]|CheekPuff(Left|Right))$",
        FaceChannel::CheekPuff,
    ),
    (
        r"^(INNER_BROW_RAISER_[LR]|BrowInnerUp(Left|Right))$",
        FaceChannel::BrowInnerUp,
    ),
    (r"^MOUTH_PUCKER_[LR]$", FaceChannel::MouthPucker),
    (r"^MOUTH_FUNNELER_(LT|RT|LB|RB)$", FaceChannel::MouthFunnel),
    (r"^LIP_SUCK_(LB|RB)$", FaceChannel::MouthRollLower),
    (r"^LIP_SUCK_(LT|RT)$", FaceChannel::MouthRollUpper),
];

/// Generation 13 shape names. Left/right in these names is from the viewer's side for the
/// eye-look and lip-press shapes, hence the crossed entries.
const FACS_NAMES: &[(&str, FaceChannel)] = &[
    ("EYES_CLOSED_L", FaceChannel::EyeBlinkLeft),
    ("EYES_CLOSED_R", FaceChannel::EyeBlinkRight),
    ("EYES_LOOK_DOWN_L", FaceChannel::EyeLookDownLeft),
    ("EYES_LOOK_DOWN_R", FaceChannel::EyeLookDownRight),
    ("EYES_LOOK_LEFT_L", FaceChannel::EyeLookOutLeft),
    ("EYES_LOOK_LEFT_R", FaceChannel::EyeLookInRight),
    ("EYES_LOOK_RIGHT_L", FaceChannel::EyeLookInLeft),
    ("EYES_LOOK_RIGHT_R", FaceChannel::EyeLookOutRight),
    ("EYES_LOOK_UP_L", FaceChannel::EyeLookUpLeft),
    ("EYES_LOOK_UP_R", FaceChannel::EyeLookUpRight),
    ("LID_TIGHTENER_L", FaceChannel::EyeSquintLeft),
    ("LID_TIGHTENER_R", FaceChannel::EyeSquintRight),
    ("UPPER_LID_RAISER_L", FaceChannel::EyeWideLeft),
    ("UPPER_LID_RAISER_R", FaceChannel::EyeWideRight),
    ("BROW_LOWERER_L", FaceChannel::BrowDownLeft),
    ("BROW_LOWERER_R", FaceChannel::BrowDownRight),
    ("OUTER_BROW_RAISER_L", FaceChannel::BrowOuterUpLeft),
    ("OUTER_BROW_RAISER_R", FaceChannel::BrowOuterUpRight),
    ("NOSE_WRINKLER_L", FaceChannel::NoseSneerLeft),
    ("NOSE_WRINKLER_R", FaceChannel::NoseSneerRight),
    ("CHEEK_RAISER_L", FaceChannel::CheekSquintLeft),
    ("CHEEK_RAISER_R", FaceChannel::CheekSquintRight),
    ("JAW_DROP", FaceChannel::JawOpen),
    ("JAW_SIDEWAYS_LEFT", FaceChannel::JawLeft),
    ("JAW_SIDEWAYS_RIGHT", FaceChannel::JawRight),
    ("JAW_THRUST", FaceChannel::JawForward),
    ("CHIN_RAISER_B", FaceChannel::MouthShrugLower),
    ("CHIN_RAISER_T", FaceChannel::MouthShrugUpper),
    ("MOUTH_LEFT", FaceChannel::MouthLeft),
    ("MOUTH_RIGHT", FaceChannel::MouthRight),
    ("DIMPLER_L", FaceChannel::MouthDimpleLeft),
    ("DIMPLER_R", FaceChannel::MouthDimpleRight),
    ("LIP_FUNNELER_LB", FaceChannel::MouthFunnel),
    ("LIP_FUNNELER_LT", FaceChannel::MouthFunnel),
    ("LIP_FUNNELER_RB", FaceChannel::MouthFunnel),
    ("LIP_FUNNELER_RT", FaceChannel::MouthFunnel),
    ("LIP_PRESSOR_L", FaceChannel::MouthPressRight),
    ("LIP_PRESSOR_R", FaceChannel::MouthPressLeft),
    ("LIP_PUCKER_L", FaceChannel::MouthPucker),
    ("LIP_PUCKER_R", FaceChannel::MouthPucker),
    ("LIP_STRETCHER_L", FaceChannel::MouthStretchLeft),
    ("LIP_STRETCHER_R", FaceChannel::MouthStretchRight),
    ("LIPS_TOWARD", FaceChannel::MouthClose),
    ("LOWER_LIP_DEPRESSOR_L", FaceChannel::MouthLowerDownLeft),
    ("LOWER_LIP_DEPRESSOR_R", FaceChannel::MouthLowerDownRight),
    ("UPPER_LIP_RAISER_L", FaceChannel::MouthUpperUpLeft),
    ("UPPER_LIP_RAISER_R", FaceChannel::MouthUpperUpRight),
    ("LIP_CORNER_DEPRESSOR_L", FaceChannel::MouthFrownLeft),
    ("LIP_CORNER_DEPRESSOR_R", FaceChannel::MouthFrownRight),
    ("LIP_CORNER_PULLER_L", FaceChannel::MouthSmileLeft),
    ("LIP_CORNER_PULLER_R", FaceChannel::MouthSmileRight),
    ("TONGUE_OUT", FaceChannel::TongueOut),
];

static MERGE_PATTERNS: LazyLock<Vec<(Regex, FaceChannel)>> = LazyLock::new(|| {
    MERGE_RULES
        .iter()
        .filter_map(|(pattern, channel)| Regex::new(pattern).ok().map(|r| (r, *channel)))
        .collect()
});

static FACS_TABLE: LazyLock<HashMap<&'static str, FaceChannel>> =
    LazyLock::new(|| FACS_NAMES.iter().copied().collect());

/// Strips the namespace (everything up to the last `.`) and uppercases the first letter.
///
/// Returns `None` for names that are empty after stripping.
pub fn normalize_shape_name(raw: &str) -> Option<String> {
    let local = raw.rsplit('.').next().unwrap_or(raw);
    let mut chars = local.chars();
    let first = chars.next()?;
    Some(first.to_uppercase().chain(chars).collect())
}

/// Resolves an authored mesh blendshape name onto its canonical channel.
pub fn resolve_shape_name(raw: &str) -> Option<FaceChannel> {
    let name = normalize_shape_name(raw)?;

    if let Some((_, channel)) = MERGE_PATTERNS.iter().find(|(re, _)| re.is_match(&name)) {
        return Some(*channel);
    }

    FACS_TABLE
        .get(name.as_str())
        .copied()
        .or_else(|| FaceChannel::from_name(&name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_merge_patterns_compile() {
        assert_eq!(MERGE_PATTERNS.len(), MERGE_RULES.len());
    }

    #[test]
    fn namespace_is_stripped_and_first_letter_uppercased() {
        assert_eq!(
            normalize_shape_name("headOnly_geo_blendShape.jawOpen").as_deref(),
            Some("JawOpen")
        );
        assert_eq!(normalize_shape_name("a.b.LIPS_TOWARD").as_deref(), Some("LIPS_TOWARD"));
        assert_eq!(normalize_shape_name("prefix."), None);
    }

    #[test]
    fn funnel_shapes_merge_onto_one_channel() {
        for name in [
            "MOUTH_FUNNELER_LT",
            "MOUTH_FUNNELER_RT",
            "MOUTH_FUNNELER_LB",
            "head_blendShape.MOUTH_FUNNELER_RB",
        ] {
            assert_eq!(resolve_shape_name(name), Some(FaceChannel::MouthFunnel));
        }
        assert_eq!(resolve_shape_name("MOUTH_FUNNELER_XX"), None);
    }

    #[test]
    fn both_generations_resolve() {
        assert_eq!(resolve_shape_name("geo.JAW_DROP"), Some(FaceChannel::JawOpen));
        assert_eq!(resolve_shape_name("geo.jawOpen"), Some(FaceChannel::JawOpen));
        assert_eq!(
            resolve_shape_name("geo.cheekPuffLeft"),
            Some(FaceChannel::CheekPuff)
        );
        assert_eq!(
            resolve_shape_name("LIP_PRESSOR_L"),
            Some(FaceChannel::MouthPressRight)
        );
        assert_eq!(
            resolve_shape_name("EYES_LOOK_LEFT_R"),
            Some(FaceChannel::EyeLookInRight)
        );
        assert_eq!(resolve_shape_name("LIP_SUCK_LT"), Some(FaceChannel::MouthRollUpper));
        assert_eq!(resolve_shape_name("geo.customWrinkle"), None);
    }
}

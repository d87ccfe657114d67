use serde::{Deserialize, Serialize};

/// Structured breakdown of a reference photo. Only `cohesive_prompt` is sent
/// back to the backend; the other fields are for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleDescription {
    pub outfit: String,
    pub accessories: String,
    pub pose: String,
    pub camera_angle: String,
    pub lighting: String,
    pub aesthetic: String,
    pub cohesive_prompt: String,
}

impl StyleDescription {
    /// Property names in the order the response schema lists them.
    pub const FIELDS: [&'static str; 7] = [
        "outfit",
        "accessories",
        "pose",
        "cameraAngle",
        "lighting",
        "aesthetic",
        "cohesivePrompt",
    ];

    /// Label/value pairs for the "Style Components" panel.
    pub fn components(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Outfit", self.outfit.clone()),
            ("Accessories", self.accessories.clone()),
            ("Pose & Angle", format!("{} / {}", self.pose, self.camera_angle)),
            ("Lighting", self.lighting.clone()),
            ("Aesthetic", self.aesthetic.clone()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_camel_case_json() {
        let json = r#"{
            "outfit": "denim jacket",
            "accessories": "silver hoops",
            "pose": "leaning on a wall",
            "cameraAngle": "low angle",
            "lighting": "golden hour",
            "aesthetic": "streetwear",
            "cohesivePrompt": "A person in a denim jacket..."
        }"#;
        let description: StyleDescription = serde_json::from_str(json).unwrap();
        assert_eq!(description.camera_angle, "low angle");
        assert_eq!(description.cohesive_prompt, "A person in a denim jacket...");
    }

    #[test]
    fn test_missing_field_is_an_error() {
        let json = r#"{"outfit": "a", "accessories": "b", "pose": "c",
            "cameraAngle": "d", "lighting": "e", "aesthetic": "f"}"#;
        assert!(serde_json::from_str::<StyleDescription>(json).is_err());
    }

    #[test]
    fn test_components_merge_pose_and_angle() {
        let description = StyleDescription {
            outfit: "o".into(),
            accessories: "a".into(),
            pose: "standing".into(),
            camera_angle: "eye-level".into(),
            lighting: "l".into(),
            aesthetic: "ae".into(),
            cohesive_prompt: "p".into(),
        };
        let components = description.components();
        assert_eq!(components[2], ("Pose & Angle", "standing / eye-level".to_string()));
    }
}

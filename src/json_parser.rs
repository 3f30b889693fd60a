/*

    Provide utilities to read the editor's JSON files.

    The parser is somewhat robust, let <a> be integer or float type,
    in JSON file <a> can be given both in quotes (string) or as is.

    e.g. In JSON file both
    "Quality": "6" and "Quality": 6
    works as quality: usize in source code

    Vector3 fields accept either "x y z" strings or [x, y, z] arrays.

    @date: 2 Oct, 2025
*/

use std::fmt::{self};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Deserializer};
use serde::de::{self, DeserializeOwned, Visitor, SeqAccess};

use crate::error::EditorResult;
use crate::prelude::*;

/// Open `path` and deserialize its JSON content into `T`.
pub fn parse_json_file<T: DeserializeOwned>(path: &Path) -> EditorResult<T> {

    let span = tracing::span!(tracing::Level::INFO, "load_json");
    let _enter = span.enter();

    let file = File::open(path)?;
    let reader = BufReader::new(file);
    debug!("Reading file from {:?}", path);

    let parsed: T = serde_json::from_reader(reader)?;
    Ok(parsed)
}


pub(crate) fn deser_usize<'de, D>(deserializer: D) -> Result<usize, D::Error>
where
    D: Deserializer<'de>,
{
    /*
        Deserialize usize type given as either string or number in JSON
    */
    let s: serde_json::Value = Deserialize::deserialize(deserializer)?;
    match s {
        serde_json::Value::Number(n) => n.as_u64()
            .map(|v| v as usize)
            .ok_or_else(|| de::Error::custom("Invalid unsigned integer")),
        serde_json::Value::String(s) => s.trim().parse::<usize>()
            .map_err(|_| de::Error::custom("Failed to parse integer from string")),
        t => Err(de::Error::custom(format!("Expected int or string, found {:#?}", t))),
    }
}

// Handles floats as string or number
pub(crate) fn deser_float<'de, D>(deserializer: D) -> Result<Float, D::Error>
where
    D: Deserializer<'de>,
{
    let s: serde_json::Value = Deserialize::deserialize(deserializer)?;
    match s {
        serde_json::Value::Number(n) => n.as_f64()
            .map(|v| v as Float)
            .ok_or_else(|| de::Error::custom("Invalid number")),
        serde_json::Value::String(s) => s.trim().parse::<Float>()
            .map_err(|_| de::Error::custom("Failed to parse float from string")),
        t => Err(de::Error::custom(format!("Expected number or string, found {t}"))),
    }
}

pub(crate) fn deser_vec3<'de, D>(deserializer: D) -> Result<Vector3, D::Error>
where
    D: Deserializer<'de>,
{
    struct Vec3Visitor;

    impl<'de> Visitor<'de> for Vec3Visitor {
        type Value = Vector3;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a Vec3 as a string 'x y z' or an array [x, y, z]")
        }

        // Given "X Y Z"
        fn visit_str<E>(self, value: &str) -> Result<Vector3, E>
        where
            E: de::Error,
        {
            parse_vec3_str(value).map_err(de::Error::custom)
        }

        // Given [X, Y, Z]
        fn visit_seq<A>(self, mut seq: A) -> Result<Vector3, A::Error>
        where
            A: SeqAccess<'de>,
        {
            let x: Float = seq
                .next_element()?
                .ok_or_else(|| de::Error::custom("Expected 3 elements in Vec3 array"))?;
            let y: Float = seq
                .next_element()?
                .ok_or_else(|| de::Error::custom("Expected 3 elements in Vec3 array"))?;
            let z: Float = seq
                .next_element()?
                .ok_or_else(|| de::Error::custom("Expected 3 elements in Vec3 array"))?;
            if seq.next_element::<Float>()?.is_some() {
                return Err(de::Error::custom("Expected only 3 elements in Vec3 array"));
            }
            Ok(Vector3::new(x, y, z))
        }
    }

    deserializer.deserialize_any(Vec3Visitor)
}

/// Helper function: parse a string like "25 25 25" into Vector3
pub fn parse_vec3_str(s: &str) -> Result<Vector3, String> {
    let parts: Vec<&str> = s.split_whitespace().collect();
    if parts.len() != 3 {
        return Err(format!("Expected 3 values, got {}", parts.len()));
    }
    let x = parts[0].parse::<Float>().map_err(|e| e.to_string())?;
    let y = parts[1].parse::<Float>().map_err(|e| e.to_string())?;
    let z = parts[2].parse::<Float>().map_err(|e| e.to_string())?;
    Ok(Vector3::new(x, y, z))
}


#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Probe {
        #[serde(deserialize_with = "deser_usize")]
        count: usize,
        #[serde(deserialize_with = "deser_float")]
        factor: Float,
        #[serde(deserialize_with = "deser_vec3")]
        position: Vector3,
    }

    #[test]
    fn test_numbers_or_strings() {
        let a: Probe = serde_json::from_str(r#"{"count": "6", "factor": 0.5, "position": "1 2 3"}"#).unwrap();
        let b: Probe = serde_json::from_str(r#"{"count": 6, "factor": "0.5", "position": [1, 2, 3]}"#).unwrap();
        assert_eq!(a.count, b.count);
        assert_eq!(a.factor, b.factor);
        assert_eq!(a.position, b.position);
        assert_eq!(a.position, Vector3::new(1., 2., 3.));
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(serde_json::from_str::<Probe>(r#"{"count": -1, "factor": 0.5, "position": "1 2 3"}"#).is_err());
        assert!(serde_json::from_str::<Probe>(r#"{"count": 1, "factor": 0.5, "position": "1 2"}"#).is_err());
        assert!(serde_json::from_str::<Probe>(r#"{"count": 1, "factor": 0.5, "position": [1, 2, 3, 4]}"#).is_err());
        assert!(parse_vec3_str("a b c").is_err());
    }
}

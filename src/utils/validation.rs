//! Utilidades de validación
//!
//! Este módulo contiene funciones helper para validación de datos
//! y conversión de tipos de formularios.

use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Deserializer};
use validator::ValidationError;

/// Tamaño máximo de la foto de perfil antes de codificar (1 MiB)
pub const MAX_PROFILE_PIC_BYTES: usize = 1024 * 1024;

/// Tipos MIME aceptados para la foto de perfil
pub const PROFILE_PIC_MIME_TYPES: &[&str] = &[
    "image/png",
    "image/jpeg",
    "image/jpg",
    "image/gif",
    "image/webp",
    "image/svg+xml",
];

lazy_static! {
    static ref DATA_URL_RE: Regex = {
        let subtypes: Vec<String> = PROFILE_PIC_MIME_TYPES
            .iter()
            .map(|mime| regex::escape(mime.trim_start_matches("image/")))
            .collect();
        Regex::new(&format!(
            r"^data:image/({});base64,[A-Za-z0-9+/=]+$",
            subtypes.join("|")
        ))
        .expect("valid data url regex")
    };
}

/// El tipo MIME (ya normalizado) está entre los aceptados
pub fn is_allowed_profile_pic_mime(mime_type: &str) -> bool {
    PROFILE_PIC_MIME_TYPES.contains(&mime_type)
}

/// Validar y convertir string a fecha
pub fn validate_date(value: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| {
        let mut error = ValidationError::new("date");
        error.add_param("value".into(), &value.to_string());
        error.add_param("format".into(), &"YYYY-MM-DD".to_string());
        error
    })
}

/// Validar que un string no esté vacío
pub fn validate_not_empty(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut error = ValidationError::new("not_empty");
        error.add_param("value".into(), &value.to_string());
        return Err(error);
    }
    Ok(())
}

/// Validar que la foto de perfil sea un data URL de imagen en base64
/// y que su contenido decodificado no supere 1 MiB.
pub fn validate_profile_pic(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Ok(());
    }
    if !DATA_URL_RE.is_match(value) {
        let mut error = ValidationError::new("profile_pic");
        error.message = Some("profile_pic must be a base64 image data URL".into());
        return Err(error);
    }
    let encoded_len = value.split_once(',').map(|(_, b64)| b64.len()).unwrap_or(0);
    if encoded_len / 4 * 3 > MAX_PROFILE_PIC_BYTES + 2 {
        let mut error = ValidationError::new("profile_pic");
        error.message = Some("profile_pic must be under 1MB".into());
        return Err(error);
    }
    Ok(())
}

/// Deserializar fechas opcionales aceptando `""` y `null` como ausencia
pub fn deserialize_optional_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw {
        None => Ok(None),
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => validate_date(&s)
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("invalid date '{}', expected YYYY-MM-DD", s))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_date() {
        assert!(validate_date("2025-06-10").is_ok());
        assert!(validate_date("10/06/2025").is_err());
    }

    #[test]
    fn test_validate_not_empty() {
        assert!(validate_not_empty("  ").is_err());
        assert!(validate_not_empty("B001").is_ok());
    }

    #[test]
    fn test_profile_pic_format() {
        assert!(validate_profile_pic("data:image/png;base64,iVBORw0KGgo=").is_ok());
        assert!(validate_profile_pic("https://example.com/me.png").is_err());
        assert!(validate_profile_pic("").is_ok());
        assert!(validate_profile_pic("data:image/png;base64,").is_err());
        assert!(validate_profile_pic("data:image/bmp;base64,AQIDBA==").is_err());
        assert!(validate_profile_pic("data:image/svg+xml;base64,PHN2Zz4=").is_ok());
    }

    #[test]
    fn test_allowed_mime_types() {
        assert!(is_allowed_profile_pic_mime("image/webp"));
        assert!(!is_allowed_profile_pic_mime("image/avif"));
        assert!(!is_allowed_profile_pic_mime("application/pdf"));
    }

    #[test]
    fn test_optional_date_accepts_blank() {
        #[derive(Deserialize)]
        struct Form {
            #[serde(default, deserialize_with = "deserialize_optional_date")]
            start_date: Option<NaiveDate>,
        }

        let blank: Form = serde_json::from_str(r#"{"start_date": ""}"#).unwrap();
        assert_eq!(blank.start_date, None);
        let missing: Form = serde_json::from_str(r#"{}"#).unwrap();
        assert_eq!(missing.start_date, None);
        let set: Form = serde_json::from_str(r#"{"start_date": "2024-01-15"}"#).unwrap();
        assert_eq!(set.start_date, NaiveDate::from_ymd_opt(2024, 1, 15));
        assert!(serde_json::from_str::<Form>(r#"{"start_date": "soon"}"#).is_err());
    }
}

//! Public application form: field names, parsing and validation.

use std::collections::HashMap;

use validator::Validate;

use super::types::ApplicantDetails;
use crate::file::{extract_extension, guess_content_type, FALLBACK_CONTENT_TYPE};

/// Multipart name of the résumé file part.
pub const RESUME_FIELD: &str = "cv";

/// Multipart name of the portfolio file part.
pub const PORTFOLIO_FIELD: &str = "portfolio";

/// Extension used when the résumé file name has none.
pub const FALLBACK_EXTENSION: &str = "pdf";

/// Recommended minimum length for free-text answers. Not enforced here.
pub const RECOMMENDED_TEXT_LENGTH: usize = 20;

/// Software offered on the form.
pub const SOFTWARE_OPTIONS: &[&str] = &["AutoCAD", "Revit", "ArchiCAD", "SketchUp", "Civil 3D"];

/// Multipart names of the required text fields, paired with the struct field they fill.
pub const REQUIRED_FIELDS: &[(&str, &str)] = &[
    ("nom", "last_name"),
    ("postnom", "middle_name"),
    ("prenom", "first_name"),
    ("sexe", "sex"),
    ("dateNaissance", "birth_date"),
    ("telephone", "phone"),
    ("email", "email"),
    ("etablissement", "institution"),
    ("filiere", "field_of_study"),
    ("niveau", "level"),
];

/// An uploaded file.
#[derive(Debug, Clone)]
pub struct Attachment {
    /// Client-side file name.
    pub file_name: String,
    /// Declared MIME type, if any.
    pub content_type: Option<String>,
    /// Content.
    pub bytes: Vec<u8>,
}

impl Attachment {
    /// Build an attachment, or `None` for an empty file input.
    pub fn from_part(file_name: String, content_type: Option<String>, bytes: Vec<u8>) -> Option<Self> {
        if file_name.trim().is_empty() && bytes.is_empty() {
            return None;
        }
        Some(Self {
            file_name,
            content_type,
            bytes,
        })
    }

    /// Storage extension: the file name's, else `pdf`.
    pub fn extension(&self) -> String {
        extract_extension(&self.file_name).unwrap_or_else(|| FALLBACK_EXTENSION.to_string())
    }

    /// MIME type to store: declared, else guessed from the name, else octet-stream.
    pub fn content_type(&self) -> String {
        match self.content_type.as_deref().map(str::trim) {
            Some(declared) if !declared.is_empty() => declared.to_string(),
            _ if self.file_name.is_empty() => FALLBACK_CONTENT_TYPE.to_string(),
            _ => guess_content_type(&self.file_name),
        }
    }
}

fn required(fields: &HashMap<String, String>, name: &str) -> String {
    fields.get(name).map(|v| v.trim().to_string()).unwrap_or_default()
}

fn optional(fields: &HashMap<String, String>, name: &str) -> Option<String> {
    fields
        .get(name)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Parse the `logiciels` value: a JSON array of names.
///
/// Anything unparsable yields an empty list.
pub fn parse_tools(raw: Option<&str>) -> Vec<String> {
    let Some(raw) = raw.map(str::trim).filter(|r| !r.is_empty()) else {
        return Vec::new();
    };
    serde_json::from_str::<Vec<String>>(raw)
        .map(|tools| {
            tools
                .into_iter()
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .collect()
        })
        .unwrap_or_default()
}

impl ApplicantDetails {
    /// Build from multipart text fields keyed by their form names.
    pub fn from_form_fields(fields: &HashMap<String, String>) -> Self {
        Self {
            last_name: required(fields, "nom"),
            middle_name: required(fields, "postnom"),
            first_name: required(fields, "prenom"),
            sex: required(fields, "sexe"),
            birth_date: required(fields, "dateNaissance"),
            phone: required(fields, "telephone"),
            email: required(fields, "email"),
            address: optional(fields, "adresse"),
            institution: required(fields, "etablissement"),
            field_of_study: required(fields, "filiere"),
            level: required(fields, "niveau"),
            academic_year: optional(fields, "annee"),
            tools: parse_tools(fields.get("logiciels").map(String::as_str)),
            tool_proficiency: optional(fields, "niveauOutils"),
            motivation: optional(fields, "motivation"),
            skills: optional(fields, "competences"),
        }
    }

    /// Form names of the required fields that are empty, in form order.
    pub fn missing_fields(&self) -> Vec<String> {
        let Err(errors) = self.validate() else {
            return Vec::new();
        };
        let invalid = errors.field_errors();
        REQUIRED_FIELDS
            .iter()
            .filter(|(_, field)| invalid.contains_key(*field))
            .map(|(form_name, _)| form_name.to_string())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_fields() -> HashMap<String, String> {
        [
            ("nom", "Mbala"),
            ("postnom", "Ilunga"),
            ("prenom", "Grace"),
            ("sexe", "F"),
            ("dateNaissance", "2001-04-12"),
            ("telephone", "+243 810 000 000"),
            ("email", "grace@example.org"),
            ("etablissement", "ISTA Kinshasa"),
            ("filiere", "Architecture"),
            ("niveau", "L3"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
    }

    #[test]
    fn test_from_form_fields_complete() {
        let mut fields = complete_fields();
        fields.insert("adresse".to_string(), "  Gombe  ".to_string());
        fields.insert("motivation".to_string(), "   ".to_string());
        fields.insert("logiciels".to_string(), r#"["AutoCAD","Revit"]"#.to_string());

        let details = ApplicantDetails::from_form_fields(&fields);
        assert_eq!(details.last_name, "Mbala");
        assert_eq!(details.address.as_deref(), Some("Gombe"));
        assert_eq!(details.motivation, None);
        assert_eq!(details.academic_year, None);
        assert_eq!(details.tools, vec!["AutoCAD", "Revit"]);
        assert!(details.missing_fields().is_empty());
    }

    #[test]
    fn test_missing_fields_in_form_order() {
        let mut fields = complete_fields();
        fields.remove("telephone");
        fields.insert("nom".to_string(), "   ".to_string());

        let details = ApplicantDetails::from_form_fields(&fields);
        assert_eq!(details.missing_fields(), vec!["nom", "telephone"]);
    }

    #[test]
    fn test_parse_tools() {
        assert_eq!(parse_tools(Some(r#"["SketchUp", " Civil 3D "]"#)), vec!["SketchUp", "Civil 3D"]);
        assert!(parse_tools(Some("not json")).is_empty());
        assert!(parse_tools(Some(r#"{"a":1}"#)).is_empty());
        assert!(parse_tools(Some("[1, 2]")).is_empty());
        assert!(parse_tools(Some("")).is_empty());
        assert!(parse_tools(None).is_empty());
    }

    #[test]
    fn test_attachment_empty_input_is_absent() {
        assert!(Attachment::from_part(String::new(), None, Vec::new()).is_none());
        assert!(Attachment::from_part("cv.pdf".to_string(), None, Vec::new()).is_some());
    }

    #[test]
    fn test_attachment_extension_and_type() {
        let cv = Attachment::from_part("Mon CV.PDF".to_string(), None, b"x".to_vec()).unwrap();
        assert_eq!(cv.extension(), "pdf");
        assert_eq!(cv.content_type(), "application/pdf");

        let bare = Attachment::from_part("resume".to_string(), Some(" ".to_string()), b"x".to_vec())
            .unwrap();
        assert_eq!(bare.extension(), "pdf");
        assert_eq!(bare.content_type(), FALLBACK_CONTENT_TYPE);

        let declared = Attachment::from_part(
            "book.zip".to_string(),
            Some("application/x-zip-compressed".to_string()),
            b"x".to_vec(),
        )
        .unwrap();
        assert_eq!(declared.extension(), "zip");
        assert_eq!(declared.content_type(), "application/x-zip-compressed");
    }
}

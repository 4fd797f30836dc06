//! Product catalog: the source of the `{perfumes_text}` placeholder.
//!
//! Loaded once from a JSON array and shared read-only.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::error::AdvisorError;
use crate::error::AppError;

const NO_ACCORD: &str = "No scent information available";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductKind {
    Perfume,
    Diffuser,
}

impl fmt::Display for ProductKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ProductKind::Perfume => "perfume",
            ProductKind::Diffuser => "diffuser",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: u64,
    pub name: String,
    pub brand: String,
    pub kind: ProductKind,
    #[serde(default)]
    pub main_accord: Option<String>,
    #[serde(default)]
    pub grade: Option<String>,
}

impl Product {
    /// `<id>. <name> (<brand>): <main accord>`, plus ` [<grade>]` when known.
    fn line(&self) -> String {
        let accord = self
            .main_accord
            .as_deref()
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .unwrap_or(NO_ACCORD);
        let mut line = format!("{}. {} ({}): {}", self.id, self.name, self.brand, accord);
        if let Some(grade) = self.grade.as_deref().filter(|g| !g.trim().is_empty()) {
            line.push_str(&format!(" [{grade}]"));
        }
        line
    }
}

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    products: Vec<Product>,
}

impl Catalog {
    pub fn new(products: Vec<Product>) -> Self {
        Self { products }
    }

    pub fn load(path: &Path) -> Result<Self, AppError> {
        let text = fs::read_to_string(path)
            .map_err(|e| AppError::Catalog(format!("cannot read {}: {e}", path.display())))?;
        let catalog = Self::from_json(&text)?;
        debug!(
            path = %path.display(),
            perfumes = catalog.products(ProductKind::Perfume).count(),
            diffusers = catalog.products(ProductKind::Diffuser).count(),
            "catalog loaded"
        );
        Ok(catalog)
    }

    pub fn from_json(text: &str) -> Result<Self, AppError> {
        let products: Vec<Product> = serde_json::from_str(text)
            .map_err(|e| AppError::Catalog(format!("invalid catalog: {e}")))?;
        Ok(Self::new(products))
    }

    pub fn products(&self, kind: ProductKind) -> impl Iterator<Item = &Product> {
        self.products.iter().filter(move |p| p.kind == kind)
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Render up to `limit` products of `kind`, one per line, in catalog order.
    pub fn render(&self, kind: ProductKind, limit: usize) -> Result<String, AdvisorError> {
        let lines: Vec<String> = self.products(kind).take(limit).map(Product::line).collect();
        if lines.is_empty() {
            return Err(AdvisorError::EmptyCatalog(kind));
        }
        Ok(lines.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const DOC: &str = r#"[
        {"id": 1, "name": "Santal 33", "brand": "Le Labo", "kind": "perfume", "main_accord": "woody", "grade": "Eau de Parfum"},
        {"id": 2, "name": "Lime Basil", "brand": "Jo Malone", "kind": "diffuser", "main_accord": "citrus"},
        {"id": 3, "name": "Philosykos", "brand": "Diptyque", "kind": "perfume"},
        {"id": 4, "name": "Gypsy Water", "brand": "Byredo", "kind": "perfume", "main_accord": "  "}
    ]"#;

    #[test]
    fn renders_lines_for_kind() {
        let catalog = Catalog::from_json(DOC).unwrap();
        assert_eq!(catalog.len(), 4);
        let text = catalog.render(ProductKind::Perfume, 25).unwrap();
        assert_eq!(
            text,
            "1. Santal 33 (Le Labo): woody [Eau de Parfum]\n\
             3. Philosykos (Diptyque): No scent information available\n\
             4. Gypsy Water (Byredo): No scent information available"
        );
        assert_eq!(
            catalog.render(ProductKind::Diffuser, 25).unwrap(),
            "2. Lime Basil (Jo Malone): citrus"
        );
    }

    #[test]
    fn limit_caps_lines() {
        let catalog = Catalog::from_json(DOC).unwrap();
        let text = catalog.render(ProductKind::Perfume, 2).unwrap();
        assert_eq!(text.lines().count(), 2);
    }

    #[test]
    fn empty_kind_is_error() {
        let catalog = Catalog::new(Vec::new());
        assert!(catalog.is_empty());
        let err = catalog.render(ProductKind::Diffuser, 25).unwrap_err();
        assert!(matches!(err, AdvisorError::EmptyCatalog(ProductKind::Diffuser)));
        assert_eq!(err.to_string(), "catalog has no diffuser products");
    }

    #[test]
    fn unknown_kind_rejected() {
        let err = Catalog::from_json(r#"[{"id": 1, "name": "x", "brand": "y", "kind": "candle"}]"#).unwrap_err();
        assert!(matches!(err, AppError::Catalog(_)));
    }

    #[test]
    fn load_reads_file() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(DOC.as_bytes()).unwrap();
        let catalog = Catalog::load(f.path()).unwrap();
        assert_eq!(catalog.products(ProductKind::Diffuser).count(), 1);
    }

    #[test]
    fn load_missing_file_errors() {
        let err = Catalog::load(Path::new("/nonexistent/catalog.json")).unwrap_err();
        assert!(err.to_string().contains("cannot read"));
    }
}

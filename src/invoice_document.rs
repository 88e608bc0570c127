//! Invoice rendering and the content-addressed archive the invoice record points at.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use rust_decimal::Decimal;
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::{debug, instrument};

use crate::domain::{InvoiceLine, Purchase};

#[derive(Debug, Clone, Error, PartialEq)]
pub enum RenderError {
    #[error("Invoice render failed: {0}")]
    Render(String),
    #[error("Invoice archive failed: {0}")]
    Archive(String),
}

/// A rendered invoice ready for archiving.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedDocument {
    pub bytes: Vec<u8>,
    pub extension: &'static str,
}

/// Where an archived document landed.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    pub path: PathBuf,
    pub hash: String,
}

pub trait InvoiceRenderer: Send + Sync {
    fn render(&self, purchase: &Purchase, lines: &[InvoiceLine]) -> Result<RenderedDocument, RenderError>;
}

/// Plain-text invoice.
#[derive(Debug, Clone, Default)]
pub struct TextInvoiceRenderer;

impl InvoiceRenderer for TextInvoiceRenderer {
    fn render(&self, purchase: &Purchase, lines: &[InvoiceLine]) -> Result<RenderedDocument, RenderError> {
        let mut out = String::new();
        let total: Decimal = lines.iter().map(|line| line.total).sum();
        let render = |e: std::fmt::Error| RenderError::Render(e.to_string());

        writeln!(out, "INVOICE").map_err(render)?;
        writeln!(out, "Purchase: {}", purchase.id).map_err(render)?;
        writeln!(out, "Customer: {}", purchase.user_id).map_err(render)?;
        writeln!(out, "Date: {}", purchase.purchase_date.format("%Y-%m-%d %H:%M:%S UTC")).map_err(render)?;
        writeln!(out).map_err(render)?;
        for line in lines {
            writeln!(
                out,
                "{:<32} {:>6} x {:>10} = {:>12}",
                line.name, line.quantity, line.price, line.total
            )
            .map_err(render)?;
        }
        writeln!(out).map_err(render)?;
        writeln!(out, "TOTAL {total}").map_err(render)?;

        Ok(RenderedDocument {
            bytes: out.into_bytes(),
            extension: "txt",
        })
    }
}

/// Stores documents under `<dir>/<sha256>.<ext>`. Identical bytes share a file.
#[derive(Debug, Clone)]
pub struct InvoiceArchive {
    dir: PathBuf,
}

impl InvoiceArchive {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[instrument(skip(self, document), fields(size = document.bytes.len()))]
    pub async fn store(&self, document: &RenderedDocument) -> Result<StoredDocument, RenderError> {
        let hash = hex::encode(Sha256::digest(&document.bytes));
        let path = self.dir.join(format!("{hash}.{}", document.extension));

        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| RenderError::Archive(e.to_string()))?;
        tokio::fs::write(&path, &document.bytes)
            .await
            .map_err(|e| RenderError::Archive(e.to_string()))?;

        debug!(path = %path.display(), "Invoice archived");
        Ok(StoredDocument { path, hash })
    }

    pub async fn remove(&self, path: &Path) -> Result<(), RenderError> {
        tokio::fs::remove_file(path)
            .await
            .map_err(|e| RenderError::Archive(e.to_string()))
    }
}

/// Renderer and archive used together at checkout.
#[derive(Clone)]
pub struct InvoiceDocuments {
    renderer: Arc<dyn InvoiceRenderer>,
    archive: InvoiceArchive,
}

impl InvoiceDocuments {
    pub fn new(renderer: Arc<dyn InvoiceRenderer>, archive: InvoiceArchive) -> Self {
        Self { renderer, archive }
    }

    /// Render and archive. The rendered document is returned alongside where
    /// it was stored so it can be attached to the customer email.
    pub async fn publish(
        &self,
        purchase: &Purchase,
        lines: &[InvoiceLine],
    ) -> Result<(RenderedDocument, StoredDocument), RenderError> {
        let document = self.renderer.render(purchase, lines)?;
        let stored = self.archive.store(&document).await?;
        Ok((document, stored))
    }

    /// Drop an archived document that no invoice record ended up pointing at.
    pub async fn discard(&self, path: &Path) -> Result<(), RenderError> {
        self.archive.remove(path).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{LineItem, PurchaseStatus};
    use chrono::Utc;

    fn purchase() -> Purchase {
        Purchase {
            id: "purchase_1".to_string(),
            user_id: "user_1".to_string(),
            items: vec![LineItem {
                product_id: "product_1".to_string(),
                name: "Lamp".to_string(),
                price: Decimal::from(100),
                quantity: 2,
            }],
            status: PurchaseStatus::Reserved,
            purchase_date: Utc::now(),
            checkout_ref: "checkout-1".to_string(),
            delivery_id: None,
            invoice_id: None,
        }
    }

    #[test]
    fn text_invoice_lists_lines_and_total() {
        let purchase = purchase();
        let lines: Vec<InvoiceLine> = purchase.items.iter().map(InvoiceLine::from).collect();
        let doc = TextInvoiceRenderer.render(&purchase, &lines).unwrap();
        let text = String::from_utf8(doc.bytes).unwrap();

        assert!(text.contains("Purchase: purchase_1"));
        assert!(text.contains("Lamp"));
        assert!(text.contains("TOTAL 200"));
    }

    #[tokio::test]
    async fn archive_is_content_addressed() {
        let dir = tempfile::tempdir().unwrap();
        let archive = InvoiceArchive::new(dir.path().join("invoices"));
        let doc = RenderedDocument {
            bytes: b"hello".to_vec(),
            extension: "txt",
        };

        let first = archive.store(&doc).await.unwrap();
        let second = archive.store(&doc).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(
            first.hash,
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
        assert_eq!(tokio::fs::read(&first.path).await.unwrap(), b"hello");
    }
}

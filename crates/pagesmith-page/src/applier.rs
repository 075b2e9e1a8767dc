//! DOM modification applier.

use tracing::{debug, info, warn};

use pagesmith_protocols::{DomModification, DomTarget, ElementId, ModificationAction, PageError};

/// Outcome counts for one batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplyReport {
    /// Modifications that matched at least one element and applied cleanly.
    pub applied: usize,
    /// Modifications whose selector matched nothing.
    pub skipped: usize,
    /// Modifications that hit an error.
    pub failed: usize,
}

impl ApplyReport {
    pub fn total(&self) -> usize {
        self.applied + self.skipped + self.failed
    }
}

/// Applies model-produced modifications to a document.
pub struct ModificationApplier;

impl ModificationApplier {
    /// Apply each modification in order. A failure is logged and the batch
    /// continues with the next item.
    pub async fn apply<T: DomTarget + ?Sized>(
        target: &T,
        modifications: &[DomModification],
    ) -> ApplyReport {
        let mut report = ApplyReport::default();

        for (index, modification) in modifications.iter().enumerate() {
            match Self::apply_one(target, modification).await {
                Ok(0) => {
                    debug!(
                        "Modification #{} ({}) matched nothing: {}",
                        index, modification.action, modification.selector
                    );
                    report.skipped += 1;
                }
                Ok(count) => {
                    debug!(
                        "Modification #{} ({}) applied to {} element(s)",
                        index, modification.action, count
                    );
                    report.applied += 1;
                }
                Err(e) => {
                    warn!(
                        "Modification #{} ({} on {}) failed: {}",
                        index, modification.action, modification.selector, e
                    );
                    report.failed += 1;
                }
            }
        }

        info!(
            "Applied modifications: {} applied, {} skipped, {} failed",
            report.applied, report.skipped, report.failed
        );
        report
    }

    /// Mutate every match; returns the match count or the first element error.
    async fn apply_one<T: DomTarget + ?Sized>(
        target: &T,
        modification: &DomModification,
    ) -> Result<usize, PageError> {
        let elements = target.query_all(&modification.selector).await?;
        let mut first_error = None;

        for element in &elements {
            if let Err(e) = Self::mutate(target, *element, modification).await {
                first_error.get_or_insert(e);
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(elements.len()),
        }
    }

    async fn mutate<T: DomTarget + ?Sized>(
        target: &T,
        element: ElementId,
        modification: &DomModification,
    ) -> Result<(), PageError> {
        let content = modification.content.as_deref();

        match modification.action {
            ModificationAction::Replace => {
                if let Some(content) = content {
                    target.set_inner_html(element, content).await?;
                }
            }
            ModificationAction::Append => {
                if let Some(content) = content {
                    let current = target.inner_html(element).await?;
                    target
                        .set_inner_html(element, &format!("{}{}", current, content))
                        .await?;
                }
            }
            ModificationAction::Prepend => {
                if let Some(content) = content {
                    let current = target.inner_html(element).await?;
                    target
                        .set_inner_html(element, &format!("{}{}", content, current))
                        .await?;
                }
            }
            ModificationAction::Remove => target.remove(element).await?,
            ModificationAction::Style => {
                for (property, value) in modification.styles.iter().flatten() {
                    target.set_style(element, property, value).await?;
                }
                for (name, value) in modification.attributes.iter().flatten() {
                    target.set_attribute(element, name, value).await?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "applier_tests.rs"]
mod tests;

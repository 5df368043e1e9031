//! Batch orchestration: workbook bytes in, augmented workbook bytes out.

use tracing::{info, instrument};

use crate::{
    biblio::{self, ParseError, Prediction},
    llm::{ChatClient, ChatError, ChatTransport},
    workbook::{SheetTable, Workbook, WorkbookError, PREDICTIONS_SHEET},
};

/// Failure of a batch. Any error aborts the whole run.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Workbook(#[from] WorkbookError),

    /// `row` is the 1-based row of the first sheet the reference came from.
    #[error("chat request for sheet row {row} failed: {source}")]
    Chat {
        row: usize,
        #[source]
        source: ChatError,
    },

    #[error("reply for sheet row {row} could not be parsed: {source}")]
    Parse {
        row: usize,
        #[source]
        source: ParseError,
    },
}

/// Result of a successful batch.
#[derive(Debug, Clone)]
pub struct ProcessOutput {
    /// The uploaded workbook with the `Predictions` sheet appended.
    pub workbook: Vec<u8>,
    /// Predictions in input row order.
    pub predictions: Vec<Prediction>,
}

/// Classify every reference of the workbook and append the results.
///
/// Rows are read and the output sheet name checked before any request is
/// made, so a workbook without the expected columns or with an existing
/// `Predictions` sheet fails without touching the network.
#[instrument(skip_all, fields(bytes = workbook.len(), model = client.model()))]
pub async fn process<T: ChatTransport>(
    client: &ChatClient<T>,
    workbook: &[u8],
) -> Result<ProcessOutput, PipelineError> {
    let mut workbook = Workbook::from_bytes(workbook);
    let references = workbook.read_numbered_references()?;
    if workbook.has_sheet(PREDICTIONS_SHEET)? {
        return Err(WorkbookError::SheetExists(PREDICTIONS_SHEET.to_string()).into());
    }
    info!(rows = references.len(), "loaded references");

    let mut predictions = Vec::with_capacity(references.len());
    for &(row, ref reference) in &references {
        let conversation = biblio::build(reference);
        let response = client
            .chat(conversation.into_messages())
            .await
            .map_err(|source| PipelineError::Chat { row, source })?;
        let reply = response
            .first_content()
            .ok_or(PipelineError::Chat {
                row,
                source: ChatError::EmptyCompletion,
            })?;
        let prediction = biblio::parse_prediction(reply)
            .map_err(|source| PipelineError::Parse { row, source })?;
        info!(
            row,
            total = references.len(),
            classification = %prediction.classification,
            "classified reference"
        );
        predictions.push(prediction);
    }

    let table = SheetTable::from_predictions(&predictions);
    workbook.append_sheet(PREDICTIONS_SHEET, &table)?;
    Ok(ProcessOutput {
        workbook: workbook.into_bytes(),
        predictions,
    })
}

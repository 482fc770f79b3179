use crate::{
    droplet_detection::{
        BaselineBand, Event, ExtractEvents, Gate, GateOutcome, PeakLocator, PeakRecord,
        PeakStrategy, Real, SaveToFileFilter, Time, Trace, find_continuous_range, gradient,
        peak_locators::LocatorStatistics,
    },
    error::{DetectionError, DetectionResult, Stage},
    parameters::DetectorParameters,
};
use itertools::Itertools;
use std::ops::Range;
use tracing::{debug, info};

/// Number of peak records logged individually in verbose mode.
const VERBOSE_PEAK_COUNT: usize = 30;

/// The trimmed trace and the events found in it.
#[derive(Debug, Clone)]
pub(crate) struct Extraction {
    pub(crate) trace: Trace,
    pub(crate) band: BaselineBand,
    pub(crate) events: Vec<Event>,
    /// Events per second, from the median gap between event starts.
    pub(crate) frequency: Real,
}

#[derive(Debug, Clone)]
pub(crate) struct Detection {
    pub(crate) statistics: LocatorStatistics,
    pub(crate) outcome: GateOutcome,
}

/// Runs range selection, baseline estimation, continuity trimming and event extraction.
#[tracing::instrument(skip_all, fields(num_samples = trace.len(), num_events))]
pub(crate) fn extract(trace: Trace, parameters: &DetectorParameters) -> DetectionResult<Extraction> {
    let trace = match parameters.select {
        Some(range) => {
            let selected = trace.select(range.left, range.right)?;
            info!(
                "{} datapoints selected ({} to {} ms)",
                selected.len(),
                range.left,
                range.right
            );
            selected
        }
        None => trace,
    };

    let band = BaselineBand::estimate(trace.signal(), parameters.tolerance)?;
    info!("Baseline is at {:.2} V", band.level);

    let range = find_continuous_range(trace.signal(), &band, parameters.continuity_run)?;
    info!("Continuous data from {} to {}", range.start, range.end);
    let trace = trace.slice(range.start, range.end);

    let settings = parameters.extractor_settings();
    let mut events_iter = trace.events(&band, &settings);
    let events: Vec<Event> = events_iter.by_ref().collect();
    debug!(rejected = events_iter.rejected(), "Events rejected by size");
    info!("{} events extracted", events.len());
    tracing::Span::current().record("num_events", events.len());

    if let Some(path) = &parameters.save_events {
        let count = events.iter().save_to_file(path)?;
        info!("{count} events saved to {}", path.display());
    }

    let frequency = event_frequency(&events);
    info!("Event frequency of {frequency:.1} Hz");

    Ok(Extraction {
        trace,
        band,
        events,
        frequency,
    })
}

/// The reciprocal of the median gap between consecutive event starts, the first gap
/// being measured from time zero. Times are in ms, so the result is in Hz.
/// Returns zero if there are no events.
pub(crate) fn event_frequency(events: &[Event]) -> Real {
    let mut gaps: Vec<Time> = std::iter::once(0.0)
        .chain(events.iter().map(|event| event.start_time))
        .tuple_windows()
        .map(|(previous, current)| current - previous)
        .collect();
    if gaps.is_empty() {
        return 0.0;
    }
    let middle = gaps.len() / 2;
    let (_, &mut median, _) = gaps.select_nth_unstable_by(middle, Time::total_cmp);
    if median > 0.0 { 1000.0 / median } else { 0.0 }
}

/// Locates a peak in every event, then applies the population gate.
#[tracing::instrument(skip_all, fields(strategy = %strategy, num_peaks))]
pub(crate) fn detect(
    extraction: &Extraction,
    strategy: &PeakStrategy,
    gate: &Gate,
) -> DetectionResult<Detection> {
    let events = &extraction.events;
    if events.is_empty() {
        return Err(DetectionError::EmptyEventSet(Stage::Extraction));
    }

    let gradient = gradient(extraction.trace.signal());
    let mut locator = PeakLocator::new(strategy, extraction.band);
    let peaks: Vec<PeakRecord> = events
        .iter()
        .enumerate()
        .filter_map(|(event_id, event)| {
            locator.locate(event_id, &extraction.trace.event_slice(event, &gradient)?)
        })
        .collect();
    tracing::Span::current().record("num_peaks", peaks.len());

    if matches!(strategy, PeakStrategy::Gradient { .. }) {
        log_shape_information(locator.statistics());
    }
    if peaks.is_empty() {
        return Err(DetectionError::EmptyEventSet(Stage::PeakLocation));
    }
    for peak in peaks.iter().take(VERBOSE_PEAK_COUNT) {
        debug!(%peak, "Peak located");
    }

    let outcome = gate.apply(peaks, events)?;
    if let Some(window) = outcome.window {
        let total = outcome.retained.len() + outcome.removed.len();
        info!(
            "Detected main population at {:.2} to {:.2} ms",
            window.left, window.right
        );
        info!(
            removed = outcome.removed.len(),
            "{} droplets after size selection",
            outcome.retained.len()
        );
        info!(
            "({:.1}% of droplets)",
            outcome.retained.len() as Real / total as Real * 100.0
        );
        for record in &outcome.removed {
            debug!(%record, "Removed by gate");
        }
    }

    Ok(Detection {
        statistics: locator.statistics().clone(),
        outcome,
    })
}

fn log_shape_information(statistics: &LocatorStatistics) {
    info!("{} well formed events", statistics.found);
    info!(
        "({:.1}% of events are well formed)",
        statistics.found as Real / statistics.examined().max(1) as Real * 100.0
    );
    info!(
        salvaged = statistics.salvaged,
        dropped = statistics.degenerate,
        "Misshapen events"
    );
    for (crossings, count) in &statistics.crossings {
        debug!(crossings, count, "Shape information");
    }
}

/// Sample ranges `[start - margin, end + margin)` about each event, clamped to
/// `0..len`. Events are ordered, so overlapping ranges are merged in a single pass.
pub(crate) fn rewrite_ranges(events: &[Event], margin: usize, len: usize) -> Vec<Range<usize>> {
    events
        .iter()
        .map(|event| event.start.saturating_sub(margin)..event.end.saturating_add(margin).min(len))
        .filter(|range| !range.is_empty())
        .coalesce(|previous, current| {
            if current.start <= previous.end {
                Ok(previous.start..previous.end.max(current.end))
            } else {
                Err((previous, current))
            }
        })
        .collect()
}

/// The samples of the trimmed trace lying within `margin` samples of an event.
/// A trace without events has nothing to keep, and is an error.
#[tracing::instrument(skip_all, fields(margin = margin, num_samples))]
pub(crate) fn reduce(extraction: &Extraction, margin: usize) -> DetectionResult<Trace> {
    if extraction.events.is_empty() {
        return Err(DetectionError::EmptyEventSet(Stage::Extraction));
    }
    let trace = &extraction.trace;
    let reduced: Trace = rewrite_ranges(&extraction.events, margin, trace.len())
        .into_iter()
        .flat_map(|range| trace.iter().skip(range.start).take(range.len()))
        .collect();
    tracing::Span::current().record("num_samples", reduced.len());
    info!(
        "{} datapoints in events (Data reduced to {:.1}%)",
        reduced.len(),
        reduced.len() as Real / trace.len().max(1) as Real * 100.0
    );
    Ok(reduced)
}

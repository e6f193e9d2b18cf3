//! FlowMonitor statistics extraction.
//!
//! Reads the XML written by the simulator's flow monitor, picks the
//! distinguished flow and turns its cumulative counters into per-packet
//! figures. The expected shape is:
//!
//! ```text
//! <FlowMonitor>
//!   <FlowStats>
//!     <Flow flowId="1" delaySum="+1.2e+09ns" jitterSum="+3e+07ns"
//!           txBytes="51200" rxPackets="98" lostPackets="2" ...>
//!       <delayHistogram nBins="3">
//!         <bin index="0" start="0" width="0.001" count="41"/>
//!       </delayHistogram>
//!       <jitterHistogram nBins="1"> ... </jitterHistogram>
//!     </Flow>
//!   </FlowStats>
//!   <Ipv4FlowClassifier>
//!     <Flow flowId="1" sourceAddress="10.1.1.1" ... />
//!   </Ipv4FlowClassifier>
//! </FlowMonitor>
//! ```
//!
//! The classifier section repeats `flowId`, so the first `Flow` in document
//! order wins.

use std::fs;
use std::path::Path;
use std::str::FromStr;

use roxmltree::{Document, Node};

use super::types::*;
use crate::registry::Scenario;
use crate::utils::duration::nanos_to_seconds;

/// The only flow this analysis consumes
pub const DISTINGUISHED_FLOW_ID: u32 = 1;

/// Metrics and histogram bins of one FlowMonitor file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlowReport {
    pub metrics: FlowMetrics,
    pub histograms: Vec<HistogramBin>,
}

/// Read an integer or float attribute. Absent means zero, present but
/// unparsable is an error.
fn numeric_attr<T>(node: Node<'_, '_>, name: &str) -> Result<T, LoadError>
where
    T: FromStr + Default,
{
    match node.attribute(name) {
        None => Ok(T::default()),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| LoadError::invalid(format!("{}.{}", node.tag_name().name(), name), raw)),
    }
}

/// First `Flow` element with the distinguished id, anywhere in the tree.
fn find_flow<'a, 'input>(doc: &'a Document<'input>) -> Option<Node<'a, 'input>> {
    doc.descendants().find(|n| {
        n.has_tag_name("Flow")
            && n.attribute("flowId")
                .and_then(|id| id.trim().parse::<u32>().ok())
                == Some(DISTINGUISHED_FLOW_ID)
    })
}

/// Counters of `flow` and the averages derived from them.
fn flow_metrics(flow: Node<'_, '_>) -> Result<FlowMetrics, LoadError> {
    let delay_sum_s = nanos_to_seconds(flow.attribute("delaySum"));
    let jitter_sum_s = nanos_to_seconds(flow.attribute("jitterSum"));
    let tx_bytes: u64 = numeric_attr(flow, "txBytes")?;
    let rx_packets: u64 = numeric_attr(flow, "rxPackets")?;
    let lost_packets: u64 = numeric_attr(flow, "lostPackets")?;

    // Floors at one: zero received packets reports the sums themselves
    let divisor = rx_packets.max(1) as f64;

    Ok(FlowMetrics {
        delay_sum_s,
        jitter_sum_s,
        tx_bytes,
        rx_packets,
        lost_packets,
        avg_delay_s: delay_sum_s / divisor,
        avg_jitter_s: jitter_sum_s / divisor,
        bytes_per_packet: tx_bytes as f64 / divisor,
    })
}

/// Bins of one histogram child of `flow`; none when the child is absent.
fn histogram_bins(
    flow: Node<'_, '_>,
    metric: HistogramMetric,
    scenario: &str,
) -> Result<Vec<HistogramBin>, LoadError> {
    let Some(histogram) = flow
        .children()
        .find(|n| n.has_tag_name(metric.element_name()))
    else {
        return Ok(Vec::new());
    };

    histogram
        .children()
        .filter(|n| n.has_tag_name("bin"))
        .map(|bin| -> Result<HistogramBin, LoadError> {
            Ok(HistogramBin {
                scenario: scenario.to_string(),
                metric,
                start_s: numeric_attr(bin, "start")?,
                width_s: numeric_attr(bin, "width")?,
                count: numeric_attr(bin, "count")?,
            })
        })
        .collect()
}

/// Extract the distinguished flow from a parsed FlowMonitor document.
///
/// A document without that flow yields all-zero metrics and no bins.
pub fn extract_flow_report(doc: &Document<'_>, scenario: &str) -> Result<FlowReport, LoadError> {
    let Some(flow) = find_flow(doc) else {
        log::debug!("Flow {} not present for {}", DISTINGUISHED_FLOW_ID, scenario);
        return Ok(FlowReport::default());
    };

    let metrics = flow_metrics(flow)?;
    let mut histograms = Vec::new();
    for metric in HistogramMetric::ALL {
        histograms.extend(histogram_bins(flow, metric, scenario)?);
    }

    Ok(FlowReport {
        metrics,
        histograms,
    })
}

/// Parse FlowMonitor XML text for `scenario`.
pub fn parse_flow_monitor(xml: &str, scenario: Scenario) -> Result<FlowReport, LoadError> {
    let doc = Document::parse(xml)?;
    extract_flow_report(&doc, &scenario.label())
}

/// Load one FlowMonitor file from disk.
pub fn load_flow_monitor_file(path: &Path, scenario: Scenario) -> Result<FlowReport, LoadError> {
    if !path.exists() {
        return Err(LoadError::Missing {
            path: path.to_path_buf(),
        });
    }

    let xml = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let report = parse_flow_monitor(&xml, scenario)?;
    log::debug!(
        "Loaded flow {} for {}: {} rx packets, {} histogram bins",
        DISTINGUISHED_FLOW_ID,
        scenario,
        report.metrics.rx_packets,
        report.histograms.len()
    );
    Ok(report)
}

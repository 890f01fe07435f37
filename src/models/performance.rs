//! Resource usage samples reported by automation runners.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutomationPerformanceDataPoint {
    pub automation_id: String,
    pub timestamp: DateTime<Utc>,
    pub execution_time_ms: u64,
    /// Megabytes
    pub memory_usage: Option<f64>,
    /// Percent
    pub cpu_usage: Option<f64>,
    /// Milliseconds
    pub network_latency: Option<f64>,
    pub queue_size: Option<u64>,
    /// Items per second
    pub throughput: Option<f64>,
}

impl AutomationPerformanceDataPoint {
    pub fn from_sample(sample: PerformanceSample) -> Self {
        Self::from_sample_at(sample, Utc::now())
    }

    pub fn from_sample_at(sample: PerformanceSample, timestamp: DateTime<Utc>) -> Self {
        Self {
            automation_id: sample.automation_id,
            timestamp,
            execution_time_ms: sample.execution_time_ms,
            memory_usage: sample.memory_usage,
            cpu_usage: sample.cpu_usage,
            network_latency: sample.network_latency,
            queue_size: sample.queue_size,
            throughput: sample.throughput,
        }
    }
}

/// Sample as submitted by a collaborator, before it is timestamped
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceSample {
    pub automation_id: String,
    pub execution_time_ms: u64,
    pub memory_usage: Option<f64>,
    pub cpu_usage: Option<f64>,
    pub network_latency: Option<f64>,
    pub queue_size: Option<u64>,
    pub throughput: Option<f64>,
}

impl PerformanceSample {
    pub fn new(automation_id: impl Into<String>, execution_time_ms: u64) -> Self {
        Self {
            automation_id: automation_id.into(),
            execution_time_ms,
            memory_usage: None,
            cpu_usage: None,
            network_latency: None,
            queue_size: None,
            throughput: None,
        }
    }

    pub fn with_memory_usage(mut self, megabytes: f64) -> Self {
        self.memory_usage = Some(megabytes);
        self
    }

    pub fn with_cpu_usage(mut self, percent: f64) -> Self {
        self.cpu_usage = Some(percent);
        self
    }

    pub fn with_network_latency(mut self, millis: f64) -> Self {
        self.network_latency = Some(millis);
        self
    }

    pub fn with_queue_size(mut self, queue_size: u64) -> Self {
        self.queue_size = Some(queue_size);
        self
    }

    pub fn with_throughput(mut self, per_second: f64) -> Self {
        self.throughput = Some(per_second);
        self
    }
}

use shared::metrics_defs::{MetricDef, MetricType};

pub const REQUEST_DURATION: MetricDef = MetricDef {
    name: "request.duration",
    metric_type: MetricType::Histogram,
    description: "Request duration in seconds. Tagged with route, status.",
};

pub const UPSTREAM_REQUESTS: MetricDef = MetricDef {
    name: "upstream.requests",
    metric_type: MetricType::Counter,
    description: "Calls made to the helpdesk API. Tagged with resource, outcome.",
};

pub const NAME_CACHE_HIT: MetricDef = MetricDef {
    name: "name_cache.hit",
    metric_type: MetricType::Counter,
    description: "Name lookups answered from the per-request cache",
};

pub const NAME_CACHE_MISS: MetricDef = MetricDef {
    name: "name_cache.miss",
    metric_type: MetricType::Counter,
    description: "Name lookups that required a contact fetch",
};

pub const ALL_METRICS: &[MetricDef] = &[
    REQUEST_DURATION,
    UPSTREAM_REQUESTS,
    NAME_CACHE_HIT,
    NAME_CACHE_MISS,
];

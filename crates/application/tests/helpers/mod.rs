#![allow(dead_code)]

mod mock_ports;

pub use mock_ports::{
    referral, response_with, MockNameserverClient, MockRecordCache, RecordingObserver, TraceEvent,
};

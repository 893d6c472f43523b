//! A volume-control driver: one `VolumeControl` object served through
//! generated accessors and reached through generated bridge entry points.

pub mod generated {
    pub mod object {
        include!(concat!(env!("OUT_DIR"), "/object.rs"));
    }

    pub mod control {
        include!(concat!(env!("OUT_DIR"), "/control.rs"));
    }

    pub mod volume_control {
        include!(concat!(env!("OUT_DIR"), "/volume_control.rs"));
    }

    /// Entry points the host calls with a driver handle and an object id.
    pub mod bridge {
        include!(concat!(env!("OUT_DIR"), "/bridge.rs"));
    }

    pub mod strings {
        include!(concat!(env!("OUT_DIR"), "/strings.rs"));
    }
}

mod volume;

pub use volume::{classes, install, VolumeControl, VolumeDriver};

use crate::{
    address::{ObjectId, Pid, PropertyAddress},
    status::{DispatchError, SizeMismatch},
    tracer::Tracer,
};
use parking_lot::RwLock;
use std::collections::HashMap;

/// A boundary query that no class in the chain claimed.
pub struct Request<'a> {
    /// Id of the object the chain belongs to.
    pub owner:      ObjectId,
    /// Id the caller asked for.
    pub object_id:  ObjectId,
    pub client_pid: Pid,
    pub address:    &'a PropertyAddress,
    pub qualifier:  Option<&'a [u8]>,
    pub tracer:     &'a dyn Tracer,
}

/// Answers queries that fall off the root of a class chain.
pub trait Fallback: Send + Sync {
    fn has_property(&self, request: &Request) -> bool;

    fn is_property_settable(
        &self,
        request: &Request,
        out: Option<&mut bool>,
    ) -> Result<(), DispatchError>;

    fn get_property_data_size(
        &self,
        request: &Request,
        out_size: Option<&mut usize>,
    ) -> Result<(), DispatchError>;

    fn get_property_data(
        &self,
        request: &Request,
        in_size: usize,
        out_size: Option<&mut usize>,
        out: Option<&mut [u8]>,
    ) -> Result<(), DispatchError>;

    fn set_property_data(
        &self,
        request: &Request,
        in_size: usize,
        data: Option<&[u8]>,
    ) -> Result<(), DispatchError>;
}

fn trace_not_found(request: &Request) {
    if request.object_id == request.owner {
        request.tracer.message("property not found");
    } else {
        request.tracer.message("object not found");
    }
}

fn not_found(request: &Request) -> DispatchError {
    trace_not_found(request);
    if request.object_id == request.owner {
        DispatchError::UnknownProperty(request.address.selector)
    } else {
        DispatchError::ObjectNotFound(request.object_id)
    }
}

/// Knows no properties: unknown-property for the owner, bad-object otherwise.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnknownPropertyFallback;

impl Fallback for UnknownPropertyFallback {
    fn has_property(&self, request: &Request) -> bool {
        trace_not_found(request);
        false
    }

    fn is_property_settable(&self, request: &Request, _out: Option<&mut bool>) -> Result<(), DispatchError> {
        Err(not_found(request))
    }

    fn get_property_data_size(&self, request: &Request, _out_size: Option<&mut usize>) -> Result<(), DispatchError> {
        Err(not_found(request))
    }

    fn get_property_data(
        &self,
        request: &Request,
        _in_size: usize,
        _out_size: Option<&mut usize>,
        _out: Option<&mut [u8]>,
    ) -> Result<(), DispatchError> {
        Err(not_found(request))
    }

    fn set_property_data(&self, request: &Request, _in_size: usize, _data: Option<&[u8]>) -> Result<(), DispatchError> {
        Err(not_found(request))
    }
}

#[derive(Debug, Clone)]
struct CustomProperty {
    value:    Vec<u8>,
    settable: bool,
}

/// Extra selectors with fixed-size raw values, answered after the class chain.
#[derive(Debug, Default)]
pub struct CustomProperties {
    properties: RwLock<HashMap<u32, CustomProperty>>,
}

impl CustomProperties {
    pub fn new() -> Self {
        CustomProperties::default()
    }

    /// Registers or replaces a property. Its size is fixed to `value.len()`.
    pub fn insert(&self, selector: u32, value: Vec<u8>, settable: bool) {
        self.properties.write().insert(selector, CustomProperty { value, settable });
    }

    pub fn remove(&self, selector: u32) -> bool {
        self.properties.write().remove(&selector).is_some()
    }

    pub fn value(&self, selector: u32) -> Option<Vec<u8>> {
        self.properties.read().get(&selector).map(|p| p.value.clone())
    }

    fn lookup<T>(
        &self,
        request: &Request,
        f: impl FnOnce(&mut CustomProperty) -> Result<T, DispatchError>,
    ) -> Result<T, DispatchError> {
        if request.object_id != request.owner {
            request.tracer.message("object not found");
            return Err(DispatchError::ObjectNotFound(request.object_id));
        }

        let mut properties = self.properties.write();
        match properties.get_mut(&request.address.selector) {
            Some(property) => f(property),
            None => {
                request.tracer.message("property not found");
                Err(DispatchError::UnknownProperty(request.address.selector))
            }
        }
    }
}

impl Fallback for CustomProperties {
    fn has_property(&self, request: &Request) -> bool {
        let found = self.lookup(request, |_| Ok(())).is_ok();
        if found {
            request.tracer.message("property found in custom property map, returning HasProperty=true");
        }
        found
    }

    fn is_property_settable(&self, request: &Request, out: Option<&mut bool>) -> Result<(), DispatchError> {
        self.lookup(request, |property| {
            match out {
                Some(out) => {
                    *out = property.settable;
                    request.tracer.message(&format!(
                        "property found in custom property map, returning IsSettable={}",
                        property.settable
                    ));
                }
                None => request.tracer.message("output buffer is null"),
            }
            Ok(())
        })
    }

    fn get_property_data_size(&self, request: &Request, out_size: Option<&mut usize>) -> Result<(), DispatchError> {
        self.lookup(request, |property| {
            match out_size {
                Some(out_size) => *out_size = property.value.len(),
                None => request.tracer.message("output buffer is null"),
            }
            Ok(())
        })
    }

    fn get_property_data(
        &self,
        request: &Request,
        in_size: usize,
        out_size: Option<&mut usize>,
        out: Option<&mut [u8]>,
    ) -> Result<(), DispatchError> {
        self.lookup(request, |property| {
            let size = property.value.len();
            if in_size < size {
                request.tracer.message(&format!("not enough space: need {}, avail {}", size, in_size));
                return Err(SizeMismatch::TooSmall { need: size, have: in_size }.into());
            }
            match out_size {
                Some(out_size) => *out_size = size,
                None => request.tracer.message("size buffer is null"),
            }
            match out.and_then(|out| out.get_mut(..size)) {
                Some(out) => {
                    request.tracer.message("returning property from custom property map");
                    out.copy_from_slice(&property.value);
                }
                None => request.tracer.message("data buffer is null"),
            }
            Ok(())
        })
    }

    fn set_property_data(&self, request: &Request, in_size: usize, data: Option<&[u8]>) -> Result<(), DispatchError> {
        self.lookup(request, |property| {
            if !property.settable {
                request.tracer.message("property does not have setter");
                return Err(DispatchError::UnknownProperty(request.address.selector));
            }
            let size = property.value.len();
            if in_size != size {
                request.tracer.message(&format!("invalid size: should be {}, got {}", size, in_size));
                return Err(SizeMismatch::NotEqual { need: size, have: in_size }.into());
            }
            let data = match data.and_then(|data| data.get(..size)) {
                Some(data) => data,
                None => {
                    request.tracer.message("input buffer is null");
                    return Err(DispatchError::NullBuffer(in_size));
                }
            };
            request.tracer.message("setting property in custom property map");
            property.value.copy_from_slice(data);
            Ok(())
        })
    }
}

//! Integration tests: runtime initialisation and native object lifecycle.

use std::cell::RefCell;
use std::rc::Rc;

use lamkit_bridge::{ColorSpace, MarshalError, ResourceSet, Runtime};
use lamkit_core::NativeHandle;
use lamkit_test_utils::{test_memory, NativeObject, RecordingNative};

fn runtime() -> Runtime<RecordingNative> {
    Runtime::new(test_memory(16), RecordingNative::new())
}

#[test]
fn initialize_creates_srgb_then_runs_hooks_in_order() {
    let mut rt = runtime();
    let order = Rc::new(RefCell::new(Vec::new()));
    for i in 0..3 {
        let order = Rc::clone(&order);
        rt.add_initializer(move |rt: &mut Runtime<RecordingNative>| {
            assert!(rt.is_initialized());
            order.borrow_mut().push(i);
        });
    }
    assert!(order.borrow().is_empty());

    let srgb = rt.initialize();
    assert_eq!(srgb.space, ColorSpace::Srgb);
    assert_eq!(rt.native().object(srgb.handle), Some(&NativeObject::ColorSpace));
    assert_eq!(*order.borrow(), vec![0, 1, 2]);

    // Second call runs nothing and returns the same colour space.
    assert_eq!(rt.initialize(), srgb);
    assert_eq!(*order.borrow(), vec![0, 1, 2]);
}

#[test]
fn late_initializer_runs_immediately() {
    let mut rt = runtime();
    rt.initialize();
    let ran = Rc::new(RefCell::new(false));
    let flag = Rc::clone(&ran);
    rt.add_initializer(move |_| *flag.borrow_mut() = true);
    assert!(*ran.borrow());
}

#[test]
fn colour_space_before_initialise_is_srgb() {
    let mut rt = runtime();
    let cs = rt.color_space();
    assert_eq!(cs.space, ColorSpace::Srgb);
    assert!(!rt.is_initialized());
    assert_eq!(rt.initialize(), cs);
}

#[test]
fn animation_binds_to_provider_and_frees_source() {
    let mut rt = runtime();
    rt.initialize();
    let provider = rt
        .make_resource_provider(&ResourceSet::single("image_0.png", vec![1, 2, 3]))
        .unwrap();
    let before = rt.memory().stats().live_allocations;

    let animation = rt.make_animation(r#"{"v":"5.7.4"}"#, &provider).unwrap();
    assert_eq!(rt.memory().stats().live_allocations, before);
    assert_eq!(
        rt.native().object(animation),
        Some(&NativeObject::Animation {
            source: r#"{"v":"5.7.4"}"#.to_owned(),
            provider: provider.handle(),
        })
    );

    rt.delete(animation);
    rt.delete(provider.handle());
    assert_eq!(rt.native().live_providers(), 0);
    assert_eq!(rt.native().live_animations(), 0);
}

#[test]
fn rejected_animation_frees_source() {
    let mut rt = Runtime::new(test_memory(4), RecordingNative::new().rejecting_animations());
    let provider = rt.make_resource_provider(&ResourceSet::new()).unwrap();
    let before = rt.memory().stats().live_allocations;
    assert_eq!(
        rt.make_animation("{}", &provider),
        Err(MarshalError::AnimationRejected)
    );
    assert_eq!(rt.memory().stats().live_allocations, before);
}

#[test]
fn deleting_null_or_twice_is_harmless() {
    let mut rt = runtime();
    let provider = rt.make_resource_provider(&ResourceSet::new()).unwrap();
    rt.delete(NativeHandle::NULL);
    rt.delete(provider.handle());
    rt.delete(provider.handle());
    assert_eq!(rt.native().live_objects(), 0);
}

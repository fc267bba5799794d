use posekit_api_core::{
    rotation::{is_unit_quat, quat_angle, quat_from_euler, slerp_quat},
    MemorySkeleton, Pose, SkeletonHandle, SkeletonJoint, IDENTITY_QUAT,
};
use posekit_timeline::{
    bake_sequence, compile_to_tracks, BakingConfig, Easing, KeyframePatch, TimelineEngine,
    TimelineSequence,
};

fn approx(a: f32, b: f32, eps: f32) {
    assert!((a - b).abs() <= eps, "left={a} right={b} eps={eps}");
}

fn head_pose(yaw: f32) -> Pose {
    Pose::new().with_joint(SkeletonJoint::Head, quat_from_euler([0.0, yaw, 0.0]))
}

/// it should hold a single keyframe's rotation at, before and after its time
#[test]
fn single_keyframe_clamps_at_endpoints() {
    let mut engine = TimelineEngine::default();
    let pose = head_pose(0.8);
    let q = pose.rotation(SkeletonJoint::Head).unwrap();
    engine.add_keyframe(pose, 1.0, None, None);

    for t in [0.0, 1.0, 5.0] {
        let sampled = engine.sample(t);
        assert_eq!(sampled.rotation(SkeletonJoint::Head), Some(q), "t={t}");
    }
}

/// it should hold pose A across a step segment instead of blending toward B
#[test]
fn step_easing_holds_leading_keyframe() {
    let mut engine = TimelineEngine::default();
    let a = head_pose(0.0);
    let b = head_pose(1.2);
    engine.add_keyframe(a.clone(), 0.0, Some("A".into()), Some(Easing::Step));
    engine.add_keyframe(b.clone(), 1.0, Some("B".into()), None);

    let mid = engine.sample(0.5);
    assert_eq!(mid.rotation(SkeletonJoint::Head), a.rotation(SkeletonJoint::Head));
    let end = engine.sample(1.0);
    assert_eq!(end.rotation(SkeletonJoint::Head), b.rotation(SkeletonJoint::Head));
}

/// it should slerp linear segments and reshape eased ones
#[test]
fn linear_and_eased_segments() {
    let a = head_pose(0.0);
    let b = head_pose(1.0);
    let qa = a.rotation(SkeletonJoint::Head).unwrap();
    let qb = b.rotation(SkeletonJoint::Head).unwrap();

    let mut engine = TimelineEngine::default();
    engine.add_keyframe(a.clone(), 0.0, None, None);
    engine.add_keyframe(b.clone(), 2.0, None, None);
    let q = engine.sample(0.5).rotation(SkeletonJoint::Head).unwrap();
    approx(quat_angle(q, slerp_quat(qa, qb, 0.25)), 0.0, 1e-4);

    let mut eased = TimelineEngine::default();
    eased.add_keyframe(a, 0.0, None, Some(Easing::EaseInOutQuad));
    eased.add_keyframe(b, 2.0, None, None);
    let q = eased.sample(0.5).rotation(SkeletonJoint::Head).unwrap();
    // ease_in_out_quad(0.25) = 0.125
    approx(quat_angle(q, slerp_quat(qa, qb, 0.125)), 0.0, 1e-4);
    assert!(is_unit_quat(q));
}

/// it should span gaps from the nearest defining keyframes rather than filling identity
#[test]
fn sparse_joints_interpolate_across_gaps() {
    let arm_a = quat_from_euler([0.0, 0.0, 0.4]);
    let arm_b = quat_from_euler([0.0, 0.0, 1.2]);
    let mut engine = TimelineEngine::default();
    engine.add_keyframe(
        Pose::new().with_joint(SkeletonJoint::LeftUpperArm, arm_a),
        0.0,
        None,
        None,
    );
    // middle keyframe only poses the head
    engine.add_keyframe(head_pose(0.5), 1.0, None, None);
    engine.add_keyframe(
        Pose::new().with_joint(SkeletonJoint::LeftUpperArm, arm_b),
        2.0,
        None,
        None,
    );

    let tracks = engine.tracks();
    assert_eq!(tracks.rotations[&SkeletonJoint::LeftUpperArm].samples().len(), 2);
    assert_eq!(tracks.rotations[&SkeletonJoint::Head].samples().len(), 1);

    let at_one = engine.sample(1.0);
    let arm = at_one.rotation(SkeletonJoint::LeftUpperArm).unwrap();
    approx(quat_angle(arm, slerp_quat(arm_a, arm_b, 0.5)), 0.0, 1e-4);
    assert_ne!(arm, IDENTITY_QUAT);
    // head track only has one sample, so it holds everywhere
    assert_eq!(
        engine.sample(0.0).rotation(SkeletonJoint::Head),
        head_pose(0.5).rotation(SkeletonJoint::Head)
    );
}

/// it should lerp root positions and expression weights
#[test]
fn root_position_and_expression_tracks() {
    let mut engine = TimelineEngine::default();
    engine.add_keyframe(
        Pose::new().with_root([0.0, 0.0, 0.0]).with_expression("aa", 0.0),
        0.0,
        None,
        None,
    );
    engine.add_keyframe(
        Pose::new().with_root([2.0, 0.0, -2.0]).with_expression("aa", 1.0),
        1.0,
        None,
        None,
    );
    let mid = engine.sample(0.25);
    assert_eq!(mid.root().unwrap().position, [0.5, 0.0, -0.5]);
    approx(mid.expression("aa").unwrap(), 0.25, 1e-6);
    assert!(mid.joints().is_empty());
}

/// it should let the most recently written keyframe win an exact time tie
#[test]
fn equal_time_tie_is_last_write_wins() {
    let mut engine = TimelineEngine::default();
    let first = engine.add_keyframe(head_pose(0.2), 1.0, None, None);
    let second = engine.add_keyframe(head_pose(0.9), 1.0, None, None);
    assert_eq!(
        engine.sample(1.0).rotation(SkeletonJoint::Head),
        head_pose(0.9).rotation(SkeletonJoint::Head)
    );

    // re-timing the older keyframe onto the tie makes it the newest write
    engine.update_keyframe(
        &first,
        KeyframePatch {
            time: Some(0.5),
            ..Default::default()
        },
    );
    engine.update_keyframe(
        &first,
        KeyframePatch {
            time: Some(1.0),
            ..Default::default()
        },
    );
    assert_eq!(engine.keyframes()[1].id, first);
    assert_eq!(engine.keyframes()[0].id, second);
    assert_eq!(
        engine.sample(1.0).rotation(SkeletonJoint::Head),
        head_pose(0.2).rotation(SkeletonJoint::Head)
    );
}

/// it should ignore keyframes beyond the duration for playback while retaining them
#[test]
fn keyframes_beyond_duration_are_inert() {
    let mut engine = TimelineEngine::default();
    engine.set_duration(1.0);
    engine.add_keyframe(head_pose(0.0), 0.0, None, None);
    engine.add_keyframe(head_pose(1.5), 3.0, None, None);
    assert_eq!(engine.keyframes().len(), 2);
    assert_eq!(
        engine.sample(1.0).rotation(SkeletonJoint::Head),
        head_pose(0.0).rotation(SkeletonJoint::Head)
    );
    // growing the duration brings it back into play
    engine.set_duration(4.0);
    assert_eq!(
        engine.sample(3.0).rotation(SkeletonJoint::Head),
        head_pose(1.5).rotation(SkeletonJoint::Head)
    );
}

/// it should drive a bound rig from tick output with one commit per frame
#[test]
fn tick_batch_drives_rig() {
    let mut rig = MemorySkeleton::humanoid(SkeletonHandle(7));
    let mut engine = TimelineEngine::default();
    engine.add_keyframe(head_pose(0.0), 0.0, None, None);
    engine.add_keyframe(head_pose(1.0), 1.0, None, None);
    engine.play();

    let out = engine.tick(0.5);
    let report = out.batch.apply(&mut rig);
    assert_eq!(report.applied, 1);
    assert_eq!(rig.commit_count(), 1);
    assert_eq!(
        rig.committed_rotation(SkeletonJoint::Head),
        engine.sample(0.5).rotation(SkeletonJoint::Head)
    );
}

/// it should bake inclusive frames across the window
#[test]
fn baking_samples_fixed_rate() {
    let mut seq = TimelineSequence::new(1.0);
    seq.insert(posekit_timeline::Keyframe {
        id: "a".into(),
        time: 0.0,
        pose: Pose::new().with_expression("blink", 0.0),
        label: None,
        easing: Easing::Linear,
    });
    seq.insert(posekit_timeline::Keyframe {
        id: "b".into(),
        time: 1.0,
        pose: Pose::new().with_expression("blink", 1.0),
        label: None,
        easing: Easing::Linear,
    });
    let baked = bake_sequence(
        &seq,
        &BakingConfig {
            frame_rate: 4.0,
            ..Default::default()
        },
    );
    assert_eq!(baked.frames.len(), 5);
    assert_eq!(baked.frames[4].time, 1.0);
    approx(baked.frames[1].pose.expression("blink").unwrap(), 0.25, 1e-6);

    let tracks = compile_to_tracks(&seq);
    assert_eq!(tracks.expressions["blink"].samples().len(), 2);
}

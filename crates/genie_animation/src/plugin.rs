use bevy::{
    app::{App, Plugin, PostUpdate, Update},
    asset::AssetApp,
    ecs::{
        intern::Interned,
        schedule::{IntoScheduleConfigs, ScheduleLabel, SystemSet},
    },
    transform::TransformSystems,
};
use genie_animation_core::prelude::{
    AvatarRigConfig, BlendshapeWeights, DrivenBlendshapes, EmoteMixer, GestureEvent,
};

use crate::{
    avatar::{
        AnimatorParameters, AvatarRig, AvatarSetup, GenieAvatar, LocomotionParams,
        SpineMocap,
    },
    loader::AvatarRigConfigLoader,
    messages::{
        AvatarTeleported, CameraSpaceChanged, EmoteRequest, JumpRequest, LocomotionStateChanged,
        OverlayStarted, OverlayStopped, StopEmote,
    },
    resources::{
        ActiveCamera, CurrentAvatar, FaceCapture, FloorProvider, GestureState, Joystick,
        PointerInput,
    },
    systems::{
        apply_facial_mocap, apply_gestures, apply_spine_mocap, cache_animated_pose,
        drive_locomotion, interpret_gestures, read_touches, setup_avatars, track_camera_space,
        update_emotes,
    },
};

/// Drives avatars from touch gestures, the joystick, facial capture and emote requests
pub struct GeniePlugin {
    /// Schedule for input, placement, locomotion and emote mixing
    pub update_schedule: Interned<dyn ScheduleLabel>,
    /// Schedule for mocap, after the animation system has posed the skeleton
    pub late_schedule: Interned<dyn ScheduleLabel>,
    /// Fill [`PointerInput`] from Bevy's own touch input instead of leaving it to the app
    pub read_touches: bool,
}

impl Default for GeniePlugin {
    fn default() -> Self {
        Self {
            update_schedule: Update.intern(),
            late_schedule: PostUpdate.intern(),
            read_touches: false,
        }
    }
}

#[derive(Clone, Debug, Copy, PartialEq, Eq, Hash, SystemSet)]
pub enum GenieSet {
    /// Builds per-avatar state for newly spawned or changed rigs
    Setup,
    /// Turns raw touches into gestures and tracks the camera space
    Input,
    /// Applies gestures to the current avatar
    Placement,
    Locomotion,
    Emote,
    /// Caches the animated pose, then applies spine and facial mocap, in that order. Runs in the
    /// late schedule, before transform propagation.
    Mocap,
}

impl Plugin for GeniePlugin {
    fn build(&self, app: &mut App) {
        self.register_assets(app);
        self.register_types(app);
        self.register_messages(app);
        self.register_component_hooks(app);

        app.init_resource::<ActiveCamera>()
            .init_resource::<FaceCapture>()
            .init_resource::<PointerInput>()
            .init_resource::<Joystick>()
            .init_resource::<GestureState>()
            .init_resource::<CurrentAvatar>()
            .init_resource::<FloorProvider>();

        app.configure_sets(
            self.update_schedule,
            (
                GenieSet::Setup,
                GenieSet::Input,
                GenieSet::Placement,
                GenieSet::Locomotion,
                GenieSet::Emote,
            )
                .chain(),
        );

        app.configure_sets(
            self.late_schedule,
            GenieSet::Mocap.before(TransformSystems::Propagate),
        );

        app.add_systems(self.update_schedule, setup_avatars.in_set(GenieSet::Setup));

        if self.read_touches {
            app.add_systems(
                self.update_schedule,
                read_touches
                    .before(interpret_gestures)
                    .in_set(GenieSet::Input),
            );
        }

        app.add_systems(
            self.update_schedule,
            (interpret_gestures, track_camera_space)
                .chain()
                .in_set(GenieSet::Input),
        );
        app.add_systems(
            self.update_schedule,
            apply_gestures.in_set(GenieSet::Placement),
        );
        app.add_systems(
            self.update_schedule,
            drive_locomotion.in_set(GenieSet::Locomotion),
        );
        app.add_systems(self.update_schedule, update_emotes.in_set(GenieSet::Emote));

        app.add_systems(
            self.late_schedule,
            (cache_animated_pose, apply_spine_mocap, apply_facial_mocap)
                .chain()
                .in_set(GenieSet::Mocap),
        );
    }
}

impl GeniePlugin {
    fn register_assets(&self, app: &mut App) {
        app.init_asset::<AvatarRigConfig>()
            .init_asset_loader::<AvatarRigConfigLoader>()
            .register_asset_reflect::<AvatarRigConfig>();
    }

    fn register_types(&self, app: &mut App) {
        app //
            .register_type::<GenieAvatar>()
            .register_type::<AvatarRig>()
            .register_type::<AvatarSetup>()
            .register_type::<SpineMocap>()
            .register_type::<LocomotionParams>()
            .register_type::<AnimatorParameters>()
            .register_type::<EmoteMixer>()
            .register_type::<BlendshapeWeights>()
            .register_type::<DrivenBlendshapes>()
            .register_type::<ActiveCamera>()
            .register_type::<FaceCapture>()
            .register_type::<PointerInput>()
            .register_type::<Joystick>()
            .register_type::<GestureState>()
            .register_type::<CurrentAvatar>();
    }

    fn register_messages(&self, app: &mut App) {
        app.add_message::<GestureEvent>()
            .add_message::<EmoteRequest>()
            .add_message::<StopEmote>()
            .add_message::<JumpRequest>()
            .add_message::<OverlayStarted>()
            .add_message::<OverlayStopped>()
            .add_message::<LocomotionStateChanged>()
            .add_message::<AvatarTeleported>()
            .add_message::<CameraSpaceChanged>();
    }

    /// Removing an avatar releases it as the gesture target and returns its meshes to rest.
    fn register_component_hooks(&self, app: &mut App) {
        app.world_mut()
            .register_component_hooks::<GenieAvatar>()
            .on_remove(|mut world, context| {
                let avatar = context.entity;
                if let Some(mut current) = world.get_resource_mut::<CurrentAvatar>()
                    && current.0 == Some(avatar)
                {
                    current.0 = None;
                }

                let Some(meshes) = world.get::<AvatarRig>(avatar).map(|rig| rig.meshes.clone())
                else {
                    return;
                };
                for mesh in meshes {
                    if let Some(mut weights) = world.get_mut::<BlendshapeWeights>(mesh) {
                        weights.reset();
                    }
                }
            });
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use bevy::{
        app::{App, TaskPoolPlugin},
        asset::AssetPlugin,
        ecs::{entity::Entity, message::Messages},
        math::{Quat, Vec2, Vec3},
        time::Time,
        transform::components::Transform,
    };
    use genie_animation_core::prelude::{
        CameraSpace, CameraView, EmoteClip, JoystickInput, LocomotionState, MixerPhase,
        OverlaySlotId, TouchPoint,
    };
    use uuid::Uuid;

    use super::*;
    use crate::{
        avatar::FaceRig,
        resources::CaptureFrame,
    };

    const DT: f32 = 1. / 60.;

    fn test_app() -> App {
        let mut app = App::new();
        app.add_plugins((
            TaskPoolPlugin::default(),
            AssetPlugin::default(),
            GeniePlugin::default(),
        ));
        app.init_resource::<Time>();
        app.insert_resource(ActiveCamera {
            view: CameraView {
                transform: Transform::from_xyz(0., 1.5, 4.).looking_at(Vec3::ZERO, Vec3::Y),
                ..Default::default()
            },
            space: CameraSpace::World,
        });
        app
    }

    fn step(app: &mut App) {
        app.world_mut()
            .resource_mut::<Time>()
            .advance_by(Duration::from_secs_f32(DT));
        app.update();
    }

    fn read<M: bevy::ecs::message::Message + Clone>(app: &App) -> Vec<M> {
        let messages = app.world().resource::<Messages<M>>();
        messages.get_cursor().read(messages).cloned().collect()
    }

    struct TestAvatar {
        avatar: Entity,
        mesh: Entity,
        head: Entity,
    }

    fn spawn_avatar(app: &mut App, with_spine: bool, position: Vec3) -> TestAvatar {
        let world = app.world_mut();
        let mesh = world
            .spawn(BlendshapeWeights::from_names([
                "head_blendShape.jawOpen",
                "head_blendShape.eyeLookUpLeft",
                "head_blendShape.customWrinkle",
            ]))
            .id();
        let joints: Vec<Entity> = (0..5).map(|_| world.spawn(Transform::default()).id()).collect();
        let eyes = world.spawn(Transform::from_xyz(0., 1.6, -0.1)).id();
        let rest_offset = Vec3::new(0., 0.02, 0.);
        let root = world.spawn(Transform::from_translation(rest_offset)).id();

        let mut spine = [None; 5];
        if with_spine {
            for (slot, joint) in spine.iter_mut().zip(&joints) {
                *slot = Some(*joint);
            }
        }

        let avatar = world
            .spawn((
                Transform::from_translation(position),
                GenieAvatar::default(),
                AvatarRig {
                    skeleton_root: Some(root),
                    spine,
                    eyes: Some(eyes),
                    meshes: vec![mesh],
                    rest_offset,
                    driven: Vec::new(),
                },
            ))
            .id();

        TestAvatar {
            avatar,
            mesh,
            head: joints[0],
        }
    }

    fn capture(app: &mut App, coefficients: &[(&str, f32)], head_rotation: Quat) {
        app.world_mut().resource_mut::<FaceCapture>().frame = Some(CaptureFrame {
            face_id: Uuid::nil(),
            coefficients: coefficients
                .iter()
                .map(|(name, value)| (name.to_string(), *value))
                .collect(),
            head_rotation,
        });
    }

    #[test]
    fn setup_builds_rig_and_selects_first_avatar() {
        let mut app = test_app();
        let first = spawn_avatar(&mut app, true, Vec3::ZERO);
        let second = spawn_avatar(&mut app, true, Vec3::X);
        step(&mut app);

        let world = app.world();
        for avatar in [first.avatar, second.avatar] {
            assert!(world.get::<AvatarSetup>(avatar).is_some());
            assert!(world.get::<FaceRig>(avatar).is_some());
            assert!(world.get::<SpineMocap>(avatar).is_some());
            assert!(world.get::<EmoteMixer>(avatar).is_some());
            assert!(world.get::<LocomotionParams>(avatar).is_some());
        }
        assert!(world.resource::<CurrentAvatar>().0.is_some());
    }

    #[test]
    fn missing_joints_only_disable_spine() {
        let mut app = test_app();
        let spawned = spawn_avatar(&mut app, false, Vec3::ZERO);
        step(&mut app);

        let world = app.world();
        assert!(world.get::<SpineMocap>(spawned.avatar).is_none());
        assert!(world.get::<FaceRig>(spawned.avatar).is_some());
        assert!(world.get::<AvatarSetup>(spawned.avatar).is_some());
    }

    #[test]
    fn capture_drives_face_and_spine() {
        let mut app = test_app();
        let spawned = spawn_avatar(&mut app, true, Vec3::ZERO);
        capture(
            &mut app,
            &[("jawOpen", 0.6), ("eyeLookUpLeft", 0.9)],
            Quat::from_rotation_y(20f32.to_radians()),
        );
        step(&mut app);
        step(&mut app);

        let weights = app.world().get::<BlendshapeWeights>(spawned.mesh).unwrap();
        assert!((weights.weight_by_name("head_blendShape.jawOpen").unwrap() - 60.).abs() < 1e-3);
        assert!((weights.weight_by_name("head_blendShape.eyeLookUpLeft").unwrap() - 75.).abs() < 1e-3);
        assert_eq!(weights.weight_by_name("head_blendShape.customWrinkle"), Some(0.));

        let head = app.world().get::<Transform>(spawned.head).unwrap();
        let expected = Quat::from_rotation_y((20f32 * 0.85).to_radians());
        assert!(head.rotation.angle_between(expected) < 1e-4);
    }

    #[test]
    fn emote_request_is_published_and_blends_in() {
        let mut app = test_app();
        let spawned = spawn_avatar(&mut app, true, Vec3::ZERO);
        step(&mut app);

        app.world_mut().write_message(EmoteRequest {
            avatar: spawned.avatar,
            clip: EmoteClip::new("Wave", 2.),
        });
        step(&mut app);

        let started = read::<OverlayStarted>(&app);
        assert_eq!(
            started,
            vec![OverlayStarted {
                avatar: spawned.avatar,
                clip: "Wave".into(),
                slot: OverlaySlotId::A,
            }]
        );
        let mixer = app.world().get::<EmoteMixer>(spawned.avatar).unwrap();
        assert_eq!(mixer.phase(), MixerPhase::BlendingIn);
        assert_eq!(mixer.blend_weight(), 0.);

        step(&mut app);
        let mixer = app.world().get::<EmoteMixer>(spawned.avatar).unwrap();
        assert!((mixer.blend_weight() - DT / 0.25).abs() < 1e-5);
    }

    #[test]
    fn rig_rebuild_keeps_playing_emote() {
        let mut app = test_app();
        let spawned = spawn_avatar(&mut app, true, Vec3::ZERO);
        step(&mut app);
        app.world_mut().write_message(EmoteRequest {
            avatar: spawned.avatar,
            clip: EmoteClip::new("Wave", 2.),
        });
        step(&mut app);
        step(&mut app);

        app.world_mut()
            .get_mut::<AvatarRig>(spawned.avatar)
            .unwrap()
            .rest_offset = Vec3::new(0., 0.03, 0.);
        step(&mut app);

        let mixer = app.world().get::<EmoteMixer>(spawned.avatar).unwrap();
        assert!(mixer.is_emoting());
        assert!(mixer.blend_weight() > DT / 0.25);
        assert!(read::<OverlayStopped>(&app).is_empty());

        app.world_mut().write_message(StopEmote {
            avatar: spawned.avatar,
            hard: true,
        });
        step(&mut app);
        assert_eq!(
            read::<OverlayStopped>(&app),
            vec![OverlayStopped {
                avatar: spawned.avatar,
                clip: "Wave".into(),
            }]
        );
    }

    #[test]
    fn joystick_walks_and_interrupts_emote() {
        let mut app = test_app();
        let spawned = spawn_avatar(&mut app, true, Vec3::ZERO);
        step(&mut app);
        app.world_mut().write_message(EmoteRequest {
            avatar: spawned.avatar,
            clip: EmoteClip::new("Wave", 2.),
        });
        step(&mut app);

        app.insert_resource(Joystick(JoystickInput {
            vector: Vec2::new(0., 1.),
        }));
        step(&mut app);

        let world = app.world();
        let params = world.get::<LocomotionParams>(spawned.avatar).unwrap();
        assert_eq!(params.state, LocomotionState::WalkRun);
        assert_eq!(params.walk_run_speed, 1.);
        let mixer = world.get::<EmoteMixer>(spawned.avatar).unwrap();
        assert_eq!(mixer.phase(), MixerPhase::BlendingOut);
        let transform = world.get::<Transform>(spawned.avatar).unwrap();
        assert!(transform.translation.z < 0.);
        assert!(transform.translation.x.abs() < 1e-5);

        let changes = read::<LocomotionStateChanged>(&app);
        assert!(changes.iter().any(|c| c.state == LocomotionState::WalkRun));
        let stopped = read::<OverlayStopped>(&app);
        assert_eq!(stopped.len(), 1);
    }

    #[test]
    fn joystick_waits_for_yaw_drag_to_end() {
        let mut app = test_app();
        let spawned = spawn_avatar(&mut app, true, Vec3::ZERO);
        step(&mut app);

        let center = app.world().resource::<ActiveCamera>().view.screen_center();
        for x in [0., 40.] {
            app.world_mut().resource_mut::<PointerInput>().touches =
                vec![TouchPoint::new(0, center + Vec2::new(x, 0.))];
            step(&mut app);
        }
        assert!(app.world().get::<LocomotionParams>(spawned.avatar).unwrap().yawing);

        app.insert_resource(Joystick(JoystickInput {
            vector: Vec2::new(0., 1.),
        }));
        app.world_mut().resource_mut::<PointerInput>().touches =
            vec![TouchPoint::new(0, center + Vec2::new(80., 0.))];
        step(&mut app);

        let world = app.world();
        let params = world.get::<LocomotionParams>(spawned.avatar).unwrap();
        assert_eq!(params.state, LocomotionState::Yaw);
        let transform = world.get::<Transform>(spawned.avatar).unwrap();
        assert!(transform.translation.length() < 1e-5);
        assert!(
            !read::<LocomotionStateChanged>(&app)
                .iter()
                .any(|c| c.state == LocomotionState::WalkRun)
        );

        app.world_mut().resource_mut::<PointerInput>().touches = Vec::new();
        step(&mut app);
        step(&mut app);
        let params = app.world().get::<LocomotionParams>(spawned.avatar).unwrap();
        assert_eq!(params.state, LocomotionState::WalkRun);
    }

    #[test]
    fn double_tap_teleports_onto_floor() {
        let mut app = test_app();
        let spawned = spawn_avatar(&mut app, true, Vec3::new(1., 0., -1.));
        step(&mut app);

        let center = app.world().resource::<ActiveCamera>().view.screen_center();
        for touches in [vec![TouchPoint::new(0, center)], vec![], vec![TouchPoint::new(1, center)]]
        {
            app.world_mut().resource_mut::<PointerInput>().touches = touches;
            step(&mut app);
        }

        let transform = app.world().get::<Transform>(spawned.avatar).unwrap();
        assert!(transform.translation.length() < 1e-3);
        assert!(transform.forward().dot(Vec3::Z) > 0.99);
        let teleported = read::<AvatarTeleported>(&app);
        assert_eq!(teleported.len(), 1);
    }

    #[test]
    fn entering_screen_space_resets_avatar() {
        let mut app = test_app();
        let spawned = spawn_avatar(&mut app, true, Vec3::new(1., 0.5, -2.));
        step(&mut app);

        app.world_mut().resource_mut::<ActiveCamera>().space = CameraSpace::Screen;
        step(&mut app);

        assert_eq!(
            *app.world().get::<Transform>(spawned.avatar).unwrap(),
            Transform::IDENTITY
        );
        assert_eq!(
            read::<CameraSpaceChanged>(&app),
            vec![CameraSpaceChanged {
                previous: CameraSpace::World,
                space: CameraSpace::Screen,
            }]
        );
    }

    #[test]
    fn removing_avatar_releases_it() {
        let mut app = test_app();
        let spawned = spawn_avatar(&mut app, true, Vec3::ZERO);
        capture(&mut app, &[("jawOpen", 0.6)], Quat::IDENTITY);
        step(&mut app);
        assert_eq!(app.world().resource::<CurrentAvatar>().0, Some(spawned.avatar));

        app.world_mut().despawn(spawned.avatar);

        assert_eq!(app.world().resource::<CurrentAvatar>().0, None);
        let weights = app.world().get::<BlendshapeWeights>(spawned.mesh).unwrap();
        assert!(weights.weights.iter().all(|w| *w == 0.));
    }
}

//! Sprite demo application
//!
//! Builds a layered scene (a full-screen background effect, a spinning
//! sprite with orbiting children, and a particle burst) and runs it against
//! the headless device, logging per-frame draw statistics.

use ember_engine::assets::ImageData;
use ember_engine::foundation::math::AABB2;
use ember_engine::prelude::*;
use ember_engine::render::quad;

struct DemoScene {
    layer: LayerId,
    ship: NodeId,
    sprite_buffer: MeshBufferId,
    shader: ShaderId,
    ship_texture: TextureId,
    frame: u64,
}

impl DemoScene {
    fn build(engine: &mut Engine) -> Result<Self, EngineError> {
        log::info!("building demo scene...");

        let size = engine.renderer().size();

        // Shared GPU resources
        let (vertices, indices) = quad(64.0, 64.0, [255, 255, 255, 255]);
        let renderer = engine.renderer_mut();
        let sprite_buffer = renderer.create_mesh_buffer(
            bytemuck::cast_slice(&indices),
            2,
            false,
            bytemuck::cast_slice(&vertices),
            VertexPCT::ATTRIBUTES,
            false,
        )?;
        let shader = renderer.load_shader_from_buffers(
            include_bytes!("shaders/textured.frag.glsl"),
            include_bytes!("shaders/textured.vert.glsl"),
            VertexPCT::ATTRIBUTES,
        )?;

        let ship_image = ImageData::solid_color(64, 64, [200, 80, 40, 255]);
        let ship_texture = renderer.load_texture_from_data(
            &ship_image.data,
            ship_image.size(),
            false,
            true,
        )?;
        let flame_image = ImageData::solid_color(8, 8, [255, 220, 60, 255]);
        let flame_texture = renderer.load_texture_from_data(
            &flame_image.data,
            flame_image.size(),
            false,
            false,
        )?;

        // One layer, one camera
        let mut camera = Camera::new();
        camera.set_zoom(1.0);
        let layer = engine.scene_manager_mut().add_layer(Layer::with_camera(camera));

        // Full-screen background: empty bounds bypass culling
        let scene = engine.scene_manager_mut();
        let mut background = Node::new();
        background.set_z(-10.0);
        background.add_drawable(Drawable::shape(
            sprite_buffer,
            shader,
            6,
            DrawMode::TriangleList,
            AABB2::empty(),
        ));
        let background = scene.create_node(background);
        scene.add_child(NodeParent::Layer(layer), background);

        // The ship, with an exhaust flame behind it and a turret in front
        let mut ship = Node::new();
        ship.set_position(Vec2::new(0.0, 0.0));
        ship.add_drawable(Drawable::sprite(
            sprite_buffer,
            shader,
            ship_texture,
            Size2::new(64.0, 64.0),
        ));
        let ship = scene.create_node(ship);
        scene.add_child(NodeParent::Layer(layer), ship);

        let mut flame = Node::new();
        flame.set_position(Vec2::new(0.0, -40.0));
        flame.set_z(-1.0);
        flame.set_opacity(0.8);
        flame.add_drawable(Drawable::particle_system(sprite_buffer, shader, flame_texture, 1));
        let flame = scene.create_node(flame);
        scene.add_child(NodeParent::Node(ship), flame);

        let mut turret = Node::new();
        turret.set_position(Vec2::new(0.0, 16.0));
        turret.set_z(1.0);
        turret.set_scale(Vec2::new(0.5, 0.5));
        turret.add_drawable(Drawable::sprite(
            sprite_buffer,
            shader,
            ship_texture,
            Size2::new(64.0, 64.0),
        ));
        let turret = scene.create_node(turret);
        scene.add_child(NodeParent::Node(ship), turret);

        log::info!(
            "scene ready: {} nodes, back buffer {}x{}",
            scene.node_count(),
            size.width,
            size.height
        );

        Ok(Self {
            layer,
            ship,
            sprite_buffer,
            shader,
            ship_texture,
            frame: 0,
        })
    }

    fn update(&mut self, engine: &mut Engine, delta_time: f32) {
        self.frame += 1;

        if let Some(ship) = engine.scene_manager_mut().node_mut(self.ship) {
            let rotation = ship.rotation() + delta_time;
            ship.set_rotation(rotation);
            ship.set_position(Vec2::new((rotation * 0.5).sin() * 120.0, 0.0));
        }
    }
}

fn main() -> Result<(), EngineError> {
    ember_engine::foundation::logging::init();

    let config = EngineConfig::new("sprite demo")
        .with_size(800.0, 600.0)
        .with_driver(Driver::Headless)
        .with_clear_color([0.02, 0.02, 0.05, 1.0]);

    let mut engine = Engine::init(config)?;
    let mut demo = DemoScene::build(&mut engine)?;

    // A gameplay thread spawns asteroids through the command queue while
    // the render loop runs
    let commands = engine.scene_manager().command_queue();
    let layer = demo.layer;
    let (sprite_buffer, shader, texture) = (demo.sprite_buffer, demo.shader, demo.ship_texture);
    let spawner = std::thread::spawn(move || {
        for i in 0..8 {
            let mut asteroid = Node::new();
            asteroid.set_position(Vec2::new(-300.0 + 80.0 * i as f32, 150.0));
            asteroid.set_z(-2.0);
            asteroid.add_drawable(Drawable::sprite(
                sprite_buffer,
                shader,
                texture,
                Size2::new(64.0, 64.0),
            ));
            commands.push(SceneCommand::AddChild {
                parent: NodeParent::Layer(layer),
                node: Box::new(asteroid),
            });
        }
    });

    for _ in 0..240 {
        demo.update(&mut engine, 1.0 / 60.0);
        engine.render_frame()?;

        if demo.frame % 60 == 0 {
            log::info!(
                "frame {}: {} draw calls, queue depth {}",
                demo.frame,
                engine.renderer().draw_call_count(),
                engine
                    .scene_manager()
                    .layer(demo.layer)
                    .map_or(0, |layer| layer.draw_queue().len())
            );
        }
    }

    spawner.join().expect("spawner thread panicked");

    log::info!("demo finished after {} frames", demo.frame);
    Ok(())
}

//! Subcommands of the `mwp-panel` binary and their dispatch onto [`Panel`].

use std::error::Error;
use std::path::PathBuf;

use clap::{Args, Subcommand};
use mwp_types::auth::{LoginRequest, UpdateProfileRequest};
use mwp_types::interface::{CreateInterfaceRequest, Interface, UpdateInterfaceRequest};
use mwp_types::ip_pool::IpPool;
use mwp_types::peer::{Peer, UpdatePeerShareExpireRequest};
use mwp_types::server::{CreateServerRequest, Server, UpdateServerRequest};

use crate::Panel;
use crate::api::QrImage;
use crate::display;
use crate::forms::{BandwidthField, BandwidthUnit, IpPoolForm, PeerForm};

pub type CliResult = Result<(), Box<dyn Error>>;

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Sign in and store the access token
    Login {
        #[arg(short, long)]
        username: String,
        #[arg(short, long)]
        password: String,
    },
    /// Forget the stored session
    Logout,
    /// Change the admin username or password
    Profile {
        #[arg(long)]
        username: Option<String>,
        #[arg(long)]
        password: Option<String>,
    },
    /// Device stats and traffic history
    Dashboard {
        /// Days of traffic history
        #[arg(long)]
        range: Option<u32>,
    },
    Servers {
        #[command(subcommand)]
        action: ServerCommand,
    },
    Interfaces {
        #[command(subcommand)]
        action: InterfaceCommand,
    },
    Pools {
        #[command(subcommand)]
        action: PoolCommand,
    },
    Peers {
        #[command(subcommand)]
        action: PeerCommand,
    },
    /// Public share page for a peer
    Share {
        uuid: String,
        /// Print the WireGuard config
        #[arg(long)]
        config: bool,
        /// Write the QR code image to this file
        #[arg(long)]
        qrcode: Option<PathBuf>,
    },
}

#[derive(Debug, Subcommand)]
pub enum ServerCommand {
    List {
        #[arg(long)]
        refresh: bool,
    },
    Add {
        name: String,
        #[arg(long)]
        ip_address: String,
        #[arg(long)]
        api_port: String,
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        comment: Option<String>,
    },
    Edit {
        id: u64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        ip_address: Option<String>,
        #[arg(long)]
        api_port: Option<String>,
        #[arg(long)]
        username: Option<String>,
        #[arg(long)]
        password: Option<String>,
        #[arg(long)]
        comment: Option<String>,
    },
    /// Enable or disable a server
    Toggle { id: u64 },
    Delete {
        id: u64,
        /// The server's name, typed again
        #[arg(long)]
        confirm: String,
    },
}

#[derive(Debug, Subcommand)]
pub enum InterfaceCommand {
    List {
        #[arg(long)]
        refresh: bool,
    },
    Add {
        name: String,
        #[arg(long)]
        listen_port: String,
        #[arg(long)]
        comment: Option<String>,
    },
    Edit {
        id: u64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        listen_port: Option<String>,
        #[arg(long)]
        mtu: Option<String>,
        #[arg(long)]
        comment: Option<String>,
    },
    Toggle { id: u64 },
    Delete {
        id: u64,
        #[arg(long)]
        confirm: String,
    },
    /// Reconcile the backend with the router
    Sync,
}

#[derive(Debug, Subcommand)]
pub enum PoolCommand {
    List {
        #[arg(long)]
        refresh: bool,
    },
    Add {
        name: String,
        #[arg(long)]
        start_ip: String,
        #[arg(long)]
        end_ip: String,
        /// Defaults to the first interface
        #[arg(long)]
        interface_id: Option<u64>,
    },
    Edit {
        id: u64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        start_ip: Option<String>,
        #[arg(long)]
        end_ip: Option<String>,
    },
    Delete {
        id: u64,
        #[arg(long)]
        confirm: String,
    },
}

#[derive(Debug, Args)]
pub struct PeerLimits {
    /// Traffic cap in GB, empty for unlimited
    #[arg(long)]
    traffic_limit: Option<String>,
    /// Expiry date, YYYY-MM-DD, empty for never
    #[arg(long)]
    expire: Option<String>,
    #[arg(long)]
    download: Option<String>,
    #[arg(long, default_value = "Mb")]
    download_unit: BandwidthUnit,
    #[arg(long)]
    upload: Option<String>,
    #[arg(long, default_value = "Mb")]
    upload_unit: BandwidthUnit,
}

impl PeerLimits {
    fn apply(self, form: &mut PeerForm) {
        if let Some(limit) = self.traffic_limit {
            form.traffic_limit = limit;
        }
        if let Some(expire) = self.expire {
            form.expire_time = expire;
        }
        if let Some(raw) = self.download {
            form.download = BandwidthField::new(raw, self.download_unit);
        }
        if let Some(raw) = self.upload {
            form.upload = BandwidthField::new(raw, self.upload_unit);
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum PeerCommand {
    List {
        #[arg(long)]
        refresh: bool,
    },
    Add {
        name: String,
        #[arg(long)]
        comment: Option<String>,
        /// Interface name, defaults to the first interface
        #[arg(long)]
        interface: Option<String>,
        #[arg(long)]
        allowed_address: Option<String>,
        #[arg(long)]
        endpoint: Option<String>,
        #[arg(long)]
        keepalive: Option<String>,
        #[arg(long)]
        preshared_key: Option<String>,
        #[command(flatten)]
        limits: PeerLimits,
    },
    Edit {
        id: u64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        comment: Option<String>,
        #[arg(long)]
        allowed_address: Option<String>,
        #[arg(long)]
        keepalive: Option<String>,
        #[command(flatten)]
        limits: PeerLimits,
    },
    Toggle { id: u64 },
    Delete {
        id: u64,
        #[arg(long)]
        confirm: String,
    },
    /// Reconcile the backend with the router
    Sync,
    ResetUsage { id: u64 },
    /// Reset usage of every peer
    ResetUsages {
        #[arg(long)]
        yes: bool,
    },
    Config { id: u64 },
    Qrcode {
        id: u64,
        /// Write the image here instead of printing a data URL
        #[arg(long)]
        output: Option<PathBuf>,
    },
    Share { id: u64 },
    ShareToggle { id: u64 },
    ShareExpire {
        id: u64,
        /// YYYY-MM-DD, omit to clear
        #[arg(long)]
        date: Option<String>,
    },
}

pub async fn run(panel: &Panel, command: Command) -> CliResult {
    match command {
        Command::Login { username, password } => {
            panel.login(&LoginRequest { username, password }).await?;
            println!("signed in");
        }
        Command::Logout => panel.logout().await?,
        Command::Profile { username, password } => {
            panel
                .update_profile(&UpdateProfileRequest { username, password })
                .await?;
        }
        Command::Dashboard { range } => dashboard(panel, range).await?,
        Command::Servers { action } => servers(panel, action).await?,
        Command::Interfaces { action } => interfaces(panel, action).await?,
        Command::Pools { action } => pools(panel, action).await?,
        Command::Peers { action } => peers(panel, action).await?,
        Command::Share { uuid, config, qrcode } => {
            let stats = panel.user_details(&uuid).await?;
            println!("{}", stats.name);
            println!("  expires:  {}", display::expire_label(stats.expire_time.as_deref()));
            println!("  limit:    {}", display::traffic_limit_label(stats.traffic_limit.as_deref()));
            println!(
                "  usage:    {} down / {} up / {} total",
                stats.download_usage, stats.upload_usage, stats.total_usage
            );
            if let Some(pct) = &stats.usage_percent {
                println!("  used:     {pct}%");
            }
            if config {
                println!("\n{}", panel.user_config(&uuid).await?);
            }
            if let Some(path) = qrcode {
                let qr = panel.user_qrcode(&uuid).await?;
                write_qr(&qr, path).await?;
            }
        }
    }
    Ok(())
}

async fn write_qr(qr: &QrImage, path: PathBuf) -> CliResult {
    tokio::fs::write(&path, &qr.bytes).await?;
    println!("wrote {} ({} bytes)", path.display(), qr.bytes.len());
    Ok(())
}

fn find<'a, T>(items: &'a [T], id: u64, kind: &str, id_of: impl Fn(&T) -> u64) -> Result<&'a T, Box<dyn Error>> {
    items
        .iter()
        .find(|item| id_of(item) == id)
        .ok_or_else(|| format!("{kind} {id} not found").into())
}

async fn dashboard(panel: &Panel, range: Option<u32>) -> CliResult {
    let (data, usage) =
        futures::try_join!(panel.device_data(), panel.daily_traffic_usage(range))?;
    println!("{} ({})", data.device_identity.identity, data.device_info.board_name);
    for stat in display::build_device_stats(Some(&data)) {
        println!("  {:<14}{}", stat.label, stat.value);
    }
    println!(
        "  servers       {}/{} active",
        data.server_info.active_servers, data.server_info.total_servers
    );
    println!(
        "  interfaces    {}/{} active",
        data.interface_info.active_interfaces, data.interface_info.total_interfaces
    );
    let peers = &data.peer_info;
    println!(
        "  peers         {} online, {} offline, {} disabled, {} total",
        peers.online_peers, peers.offline_peers, peers.disabled_peers, peers.total_peers
    );
    for peer in peers.recent_online_peers.iter().flatten() {
        println!("    {} {:<20} {}", display::initials(&peer.name), peer.name, peer.last_seen);
    }

    if !usage.is_empty() {
        println!("\ntraffic (GB)");
        for day in usage.iter() {
            println!(
                "  {}  down {:>8}  up {:>8}  total {:>8}",
                day.date,
                display::format_gb(&day.download).unwrap_or_default(),
                display::format_gb(&day.upload).unwrap_or_default(),
                display::format_gb(&day.total).unwrap_or_default(),
            );
        }
    }
    Ok(())
}

fn print_server(s: &Server) {
    println!(
        "{:>4}  {:<20} {:<16} {:<6} {:<12} {}",
        s.id,
        s.name,
        s.ip_address,
        s.api_port,
        display::server_status_badge(s.status),
        if s.is_active { "enabled" } else { "disabled" }
    );
}

async fn servers(panel: &Panel, action: ServerCommand) -> CliResult {
    match action {
        ServerCommand::List { refresh } => {
            let servers = if refresh {
                panel.refresh_servers().await?
            } else {
                panel.servers().await?
            };
            servers.iter().for_each(print_server);
            if !panel.can_add_server().await? {
                println!("(server limit reached)");
            }
        }
        ServerCommand::Add {
            name,
            ip_address,
            api_port,
            username,
            password,
            comment,
        } => {
            let server = panel
                .create_server(&CreateServerRequest {
                    comment,
                    name,
                    ip_address,
                    api_port,
                    username,
                    password,
                })
                .await?;
            print_server(&server);
        }
        ServerCommand::Edit {
            id,
            name,
            ip_address,
            api_port,
            username,
            password,
            comment,
        } => {
            let servers = panel.servers().await?;
            let current = find(servers.as_slice(), id, "server", |s| s.id)?;
            let mut req = UpdateServerRequest::from(current);
            req.name = name.or(req.name);
            req.ip_address = ip_address.or(req.ip_address);
            req.api_port = api_port.or(req.api_port);
            req.username = username.or(req.username);
            req.password = password;
            req.comment = comment.or(req.comment);
            print_server(&panel.update_server(&req).await?);
        }
        ServerCommand::Toggle { id } => {
            let servers = panel.servers().await?;
            panel.toggle_server(find(servers.as_slice(), id, "server", |s| s.id)?).await?;
        }
        ServerCommand::Delete { id, confirm } => {
            let servers = panel.servers().await?;
            panel
                .delete_server_confirmed(find(servers.as_slice(), id, "server", |s| s.id)?, &confirm)
                .await?;
        }
    }
    Ok(())
}

fn print_interface(i: &Interface) {
    println!(
        "{:>4}  {:<12} port {:<6} mtu {:<5} {} {}",
        i.id,
        i.name,
        i.listen_port,
        i.mtu,
        display::running_badge(i.is_running),
        if i.disabled { "disabled" } else { "enabled" }
    );
}

async fn interfaces(panel: &Panel, action: InterfaceCommand) -> CliResult {
    match action {
        InterfaceCommand::List { refresh } => {
            let list = if refresh {
                panel.refresh_interfaces().await?
            } else {
                panel.interfaces().await?
            };
            list.iter().for_each(print_interface);
        }
        InterfaceCommand::Add {
            name,
            listen_port,
            comment,
        } => {
            let iface = panel
                .create_interface(&CreateInterfaceRequest {
                    comment,
                    name,
                    listen_port,
                })
                .await?;
            print_interface(&iface);
        }
        InterfaceCommand::Edit {
            id,
            name,
            listen_port,
            mtu,
            comment,
        } => {
            let list = panel.interfaces().await?;
            let mut req = UpdateInterfaceRequest::from(find(list.as_slice(), id, "interface", |i| i.id)?);
            req.name = name.or(req.name);
            req.listen_port = listen_port.or(req.listen_port);
            req.mtu = mtu.or(req.mtu);
            req.comment = comment.or(req.comment);
            print_interface(&panel.update_interface(&req).await?);
        }
        InterfaceCommand::Toggle { id } => {
            let list = panel.interfaces().await?;
            panel.toggle_interface(find(list.as_slice(), id, "interface", |i| i.id)?).await?;
        }
        InterfaceCommand::Delete { id, confirm } => {
            let list = panel.interfaces().await?;
            panel
                .delete_interface_confirmed(find(list.as_slice(), id, "interface", |i| i.id)?, &confirm)
                .await?;
        }
        InterfaceCommand::Sync => panel.sync_interfaces().await?,
    }
    Ok(())
}

fn print_pool(p: &IpPool) {
    println!(
        "{:>4}  {:<16} {} - {}  {}/{} used, {} free",
        p.id, p.name, p.start_ip, p.end_ip, p.used_ip, p.total_ip, p.remaining_ip
    );
}

async fn pools(panel: &Panel, action: PoolCommand) -> CliResult {
    match action {
        PoolCommand::List { refresh } => {
            let list = if refresh {
                panel.refresh_ip_pools().await?
            } else {
                panel.ip_pools().await?
            };
            list.iter().for_each(print_pool);
        }
        PoolCommand::Add {
            name,
            start_ip,
            end_ip,
            interface_id,
        } => {
            let mut form = IpPoolForm::create();
            form.name = name;
            form.start_ip = start_ip;
            form.end_ip = end_ip;
            form.interface_id = interface_id;
            panel.prepare_ip_pool_form(&mut form).await?;
            print_pool(&panel.submit_ip_pool(&form).await?);
        }
        PoolCommand::Edit {
            id,
            name,
            start_ip,
            end_ip,
        } => {
            let list = panel.ip_pools().await?;
            let mut form = IpPoolForm::edit(find(list.as_slice(), id, "pool", |p| p.id)?);
            if let Some(name) = name {
                form.name = name;
            }
            if let Some(start) = start_ip {
                form.start_ip = start;
            }
            if let Some(end) = end_ip {
                form.end_ip = end;
            }
            print_pool(&panel.submit_ip_pool(&form).await?);
        }
        PoolCommand::Delete { id, confirm } => {
            let list = panel.ip_pools().await?;
            panel
                .delete_ip_pool_confirmed(find(list.as_slice(), id, "pool", |p| p.id)?, &confirm)
                .await?;
        }
    }
    Ok(())
}

fn print_peer(p: &Peer) {
    let badges: Vec<String> = display::peer_status_badges(&p.status)
        .iter()
        .map(ToString::to_string)
        .collect();
    println!(
        "{:>4}  {:<20} {:<8} {:<18} {:<10} {:<12} {:<20} {} {}",
        p.id,
        p.name,
        p.interface,
        p.allowed_address,
        display::traffic_limit_label(p.traffic_limit.as_deref()),
        display::expire_label(p.expire_time.as_deref()),
        display::bandwidth_label(p.download_bandwidth.as_deref(), p.upload_bandwidth.as_deref()),
        display::online_badge(p.is_online),
        badges.join(" ")
    );
}

async fn peer_by_id(panel: &Panel, id: u64) -> Result<Peer, Box<dyn Error>> {
    let list = panel.peers().await?;
    Ok(find(list.as_slice(), id, "peer", |p| p.id)?.clone())
}

async fn peers(panel: &Panel, action: PeerCommand) -> CliResult {
    match action {
        PeerCommand::List { refresh } => {
            let list = if refresh {
                panel.refresh_peers().await?
            } else {
                panel.peers().await?
            };
            list.iter().for_each(print_peer);
        }
        PeerCommand::Add {
            name,
            comment,
            interface,
            allowed_address,
            endpoint,
            keepalive,
            preshared_key,
            limits,
        } => {
            let mut form = PeerForm::create();
            panel.prepare_peer_form(&mut form).await?;
            if let Some(wanted) = interface {
                let list = panel.interfaces().await?;
                let iface = list
                    .iter()
                    .find(|i| i.name == wanted)
                    .ok_or_else(|| format!("interface {wanted} not found"))?;
                panel.change_peer_interface(&mut form, iface).await?;
            }
            form.name = name;
            form.comment = comment.unwrap_or_default();
            if let Some(addr) = allowed_address {
                form.allowed_address = addr;
            }
            if let Some(endpoint) = endpoint {
                form.endpoint = endpoint;
            }
            if let Some(keepalive) = keepalive {
                form.persistent_keepalive = keepalive;
            }
            form.preshared_key = preshared_key.unwrap_or_default();
            limits.apply(&mut form);
            print_peer(&panel.submit_peer(&form).await?);
        }
        PeerCommand::Edit {
            id,
            name,
            comment,
            allowed_address,
            keepalive,
            limits,
        } => {
            let mut form = PeerForm::edit(&peer_by_id(panel, id).await?);
            if let Some(name) = name {
                form.name = name;
            }
            if let Some(comment) = comment {
                form.comment = comment;
            }
            if let Some(addr) = allowed_address {
                form.allowed_address = addr;
            }
            if let Some(keepalive) = keepalive {
                form.persistent_keepalive = keepalive;
            }
            limits.apply(&mut form);
            print_peer(&panel.submit_peer(&form).await?);
        }
        PeerCommand::Toggle { id } => panel.toggle_peer(&peer_by_id(panel, id).await?).await?,
        PeerCommand::Delete { id, confirm } => {
            panel
                .delete_peer_confirmed(&peer_by_id(panel, id).await?, &confirm)
                .await?;
        }
        PeerCommand::Sync => panel.sync_peers().await?,
        PeerCommand::ResetUsage { id } => {
            panel.reset_peer_usage(&peer_by_id(panel, id).await?).await?;
        }
        PeerCommand::ResetUsages { yes } => {
            if !yes {
                return Err("resetting every peer's usage needs --yes".into());
            }
            panel.reset_peer_usages().await?;
        }
        PeerCommand::Config { id } => println!("{}", panel.peer_config(id).await?),
        PeerCommand::Qrcode { id, output } => {
            let qr = panel.peer_qrcode(id).await?;
            match output {
                Some(path) => write_qr(&qr, path).await?,
                None => println!("{}", qr.to_data_url()),
            }
        }
        PeerCommand::Share { id } => {
            let share = panel.peer_share(id).await?;
            println!("shared:  {}", share.is_shared);
            println!("link:    {}", share.share_link.as_deref().unwrap_or("-"));
            println!("expires: {}", display::expire_label(share.expire_time.as_deref()));
        }
        PeerCommand::ShareToggle { id } => {
            panel.peer_share(id).await?;
            panel.toggle_peer_share(id).await?;
        }
        PeerCommand::ShareExpire { id, date } => {
            let expire_time = match date {
                Some(d) => crate::forms::expire_time_value(&d)?,
                None => None,
            };
            panel
                .update_peer_share_expire(&UpdatePeerShareExpireRequest { id, expire_time })
                .await?;
        }
    }
    Ok(())
}

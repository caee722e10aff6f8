//! The resource registry: every table exposed through the generic CRUD
//! surface, with its mount path and write allow-list.

use super::resource::{ColumnType, ResourceConfig};

/// All registered resources as (mount path, config), in mount order.
pub fn resources() -> Vec<(&'static str, ResourceConfig)> {
    vec![
        (
            "/api/plans",
            ResourceConfig::new(
                "plans",
                &["name", "max_obras", "max_residentes", "price", "description", "is_active"],
            ),
        ),
        (
            "/api/constructoras",
            ResourceConfig::new(
                "constructoras",
                &[
                    "user_id",
                    "nombre_empresa",
                    "rfc",
                    "telefono",
                    "email",
                    "direccion",
                    "plan_id",
                    "subscription_status",
                    "subscription_start_date",
                    "subscription_end_date",
                    "monto_minimo",
                    "monto_maximo",
                    "is_active",
                ],
            ),
        ),
        (
            "/api/obras",
            ResourceConfig::new(
                "obras",
                &[
                    "constructora_id",
                    "nombre",
                    "direccion",
                    "descripcion",
                    "fecha_inicio",
                    "fecha_fin_estimada",
                    "fecha_fin_real",
                    "presupuesto",
                    "is_active",
                    "fecha_baja",
                    "motivo_baja",
                ],
            ),
        ),
        (
            "/api/residentes",
            ResourceConfig::new(
                "residentes",
                &[
                    "user_id",
                    "constructora_id",
                    "telefono",
                    "nombre",
                    "apellidos",
                    "email",
                    "is_active",
                    "fecha_baja",
                    "motivo_baja",
                ],
            ),
        ),
        (
            "/api/historial_telefonos",
            ResourceConfig::new(
                "historial_telefonos",
                &["residente_id", "telefono_anterior", "telefono_nuevo", "motivo", "cambiado_por"],
            ),
        ),
        (
            "/api/asignaciones_obra",
            ResourceConfig::new(
                "asignaciones_obra",
                &["residente_id", "obra_id", "fecha_inicio", "fecha_fin", "is_active", "motivo_cambio"],
            ),
        ),
        (
            "/api/configuracion_reportes",
            ResourceConfig::new(
                "configuracion_reportes",
                &["residente_id", "dias_envio", "hora_envio", "correos_destino", "mensaje_cuerpo", "is_active"],
            )
            .column_type("dias_envio", ColumnType::IntArray)
            .column_type("correos_destino", ColumnType::TextArray),
        ),
        (
            "/api/reportes",
            ResourceConfig::new(
                "reportes",
                &[
                    "obra_id",
                    "residente_id",
                    "asignacion_id",
                    "fecha",
                    "descripcion_actividades",
                    "personal_asistente",
                    "maquinaria_utilizada",
                    "materiales_utilizados",
                    "incidencias",
                    "avance_porcentaje",
                    "clima",
                    "fotos_urls",
                    "enviado",
                    "fecha_envio",
                    "whatsapp_message_id",
                    "telefono_origen",
                    "mensaje_original",
                    "procesado_por_ia",
                ],
            )
            .column_type("fotos_urls", ColumnType::TextArray),
        ),
        (
            "/api/pagos",
            ResourceConfig::new(
                "pagos",
                &[
                    "constructora_id",
                    "plan_id",
                    "monto",
                    "concepto",
                    "metodo_pago",
                    "referencia_pago",
                    "status",
                    "fecha_pago",
                    "periodo_inicio",
                    "periodo_fin",
                ],
            ),
        ),
        (
            "/api/user_roles",
            ResourceConfig::new("user_roles", &["user_id", "role", "constructora_id"]),
        ),
        (
            "/api/mensajes_whatsapp_log",
            ResourceConfig::new(
                "mensajes_whatsapp_log",
                &[
                    "residente_id",
                    "telefono",
                    "mensaje",
                    "tipo",
                    "whatsapp_message_id",
                    "metadata",
                    "procesado",
                    "error",
                ],
            )
            .column_type("metadata", ColumnType::Jsonb),
        ),
        (
            "/api/gastos-obra",
            ResourceConfig::new(
                "gastos_obra",
                &[
                    "obra_id",
                    "residente_id",
                    "fecha",
                    "categoria",
                    "subcategoria",
                    "descripcion",
                    "cantidad",
                    "unidad",
                    "precio_unitario",
                    "monto_total",
                    "proveedor",
                    "factura_numero",
                    "factura_url",
                    "metodo_pago",
                    "comprobante_urls",
                    "notas",
                    "aprobado",
                    "aprobado_por",
                    "fecha_aprobacion",
                    "incluir_en_reporte",
                    "whatsapp_message_id",
                    "enviado_por_whatsapp",
                ],
            )
            .column_type("comprobante_urls", ColumnType::TextArray),
        ),
    ]
}
